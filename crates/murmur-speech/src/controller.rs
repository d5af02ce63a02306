//! Speech session controller.
//!
//! The `SpeechSessionController` mediates between UI intent (start/stop) and the
//! recognition engine. It owns at most one active session and the retry
//! counter; `start` and `stop` are its only public mutators besides the event
//! entry points `handle_event` and `fire_retry`, which are driven by
//! `SpeechService` (or directly by tests).

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use murmur_core::config::SpeechConfig;

use crate::callbacks::SessionCallbacks;
use crate::capability::CapabilityProvider;
use crate::engine::{
    EngineEvent, EngineFactory, EngineFailure, ErrorCode, EventSink, RecognitionEngine,
    RecognitionResult, SessionEvent,
};
use crate::error::SpeechError;
use crate::retry::{PendingRetry, RetryCounter, RetryPolicy};
use crate::session::{RecognitionConfig, RecognitionSession, SessionId};
use crate::state::SessionState;

/// The live session together with its engine and the caller's callbacks.
struct ActiveSession {
    session: RecognitionSession,
    engine: Box<dyn RecognitionEngine>,
    callbacks: SessionCallbacks,
    result_received: bool,
    pending_retry: Option<u64>,
}

impl ActiveSession {
    fn transition(&mut self, target: SessionState) {
        if let Err(e) = self.session.transition(target) {
            tracing::debug!(session_id = %self.session.id, error = %e, "State transition skipped");
        }
    }
}

pub struct SpeechSessionController {
    capabilities: Box<dyn CapabilityProvider>,
    factory: Box<dyn EngineFactory>,
    policy: RetryPolicy,
    language: String,
    events: UnboundedSender<SessionEvent>,
    active: Option<ActiveSession>,
    retries: RetryCounter,
    next_session: u64,
    next_ticket: u64,
}

impl std::fmt::Debug for SpeechSessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechSessionController")
            .field("policy", &self.policy)
            .field("language", &self.language)
            .field("active_session", &self.active.as_ref().map(|a| a.session.id))
            .field("retries", &self.retries)
            .finish()
    }
}

impl SpeechSessionController {
    /// Create a controller. Engine events for every session it starts arrive on
    /// the returned receiver.
    pub fn new(
        capabilities: Box<dyn CapabilityProvider>,
        factory: Box<dyn EngineFactory>,
        policy: RetryPolicy,
        language: impl Into<String>,
    ) -> (Self, UnboundedReceiver<SessionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let controller = Self {
            capabilities,
            factory,
            policy,
            language: language.into(),
            events,
            active: None,
            retries: RetryCounter::new(),
            next_session: 0,
            next_ticket: 0,
        };
        (controller, rx)
    }

    pub fn from_config(
        config: &SpeechConfig,
        capabilities: Box<dyn CapabilityProvider>,
        factory: Box<dyn EngineFactory>,
    ) -> (Self, UnboundedReceiver<SessionEvent>) {
        Self::new(
            capabilities,
            factory,
            RetryPolicy::from_config(config),
            config.language.clone(),
        )
    }

    /// Whether the host can recognize speech at all.
    pub fn supports_recognition(&self) -> bool {
        self.capabilities.supports_recognition()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_session(&self) -> Option<&RecognitionSession> {
        self.active.as_ref().map(|a| &a.session)
    }

    /// State of the active session, `Idle` when there is none.
    pub fn state(&self) -> SessionState {
        self.active
            .as_ref()
            .map(|a| a.session.state())
            .unwrap_or_default()
    }

    pub fn retry_count(&self) -> u32 {
        self.retries.get()
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Start a new recording attempt.
    ///
    /// Returns `true` once the engine start primitive has been invoked. Every
    /// failure is reported through `on_error` and yields `false`; this never
    /// panics or returns an error.
    pub fn start(&mut self, mut callbacks: SessionCallbacks) -> bool {
        if !self.capabilities.supports_recognition() {
            return reject(&mut callbacks, SpeechError::Unsupported);
        }
        if !self.capabilities.is_secure_context() {
            return reject(&mut callbacks, SpeechError::InsecureContext);
        }

        if let Some(previous) = self.active.take() {
            teardown(previous, &mut callbacks);
        }

        let local = self.capabilities.is_local_development();
        let config = RecognitionConfig::for_environment(&self.language, local);
        self.next_session += 1;
        let id = SessionId(self.next_session);

        let engine = match self
            .factory
            .create(&config, EventSink::new(id, self.events.clone()))
        {
            Ok(engine) => engine,
            Err(failure) => return reject_start(&mut callbacks, failure),
        };
        callbacks.debug(&format!(
            "Speech recognition session {} created (language: {}, continuous: {}, interim results: {})",
            id, config.language, config.continuous, config.interim_results
        ));

        let mut active = ActiveSession {
            session: RecognitionSession::new(id, config),
            engine,
            callbacks,
            result_received: false,
            pending_retry: None,
        };

        if let Err(failure) = active.engine.start() {
            return reject_start(&mut active.callbacks, failure);
        }
        active.transition(SessionState::Starting);
        active.callbacks.debug("Recording started successfully");
        tracing::info!(
            session_id = %id,
            local_development = local,
            "Speech recognition session started"
        );

        self.active = Some(active);
        true
    }

    /// Stop the active session, if any, and reset the retry counter.
    ///
    /// Engine errors are reported to `on_debug` and otherwise ignored. Calling
    /// this without an active session is a no-op apart from the reset.
    pub fn stop(&mut self, mut on_debug: Option<&mut dyn FnMut(&str)>) {
        if let Some(mut active) = self.active.take() {
            active.transition(SessionState::Stopping);
            match active.engine.stop() {
                Ok(()) => emit(&mut on_debug, "Stopped speech recognition"),
                Err(e) => emit(&mut on_debug, &format!("Error stopping recognition: {}", e)),
            }
            active.transition(SessionState::Idle);
            tracing::info!(
                session_id = %active.session.id,
                elapsed_secs = active.session.elapsed_secs(),
                "Speech recognition session stopped"
            );
        }
        self.retries.reset();
    }

    /// React to one engine event.
    ///
    /// Events from any session other than the active one are dropped. Returns a
    /// retry ticket when a network error should restart the engine later.
    pub fn handle_event(&mut self, event: SessionEvent) -> Option<PendingRetry> {
        let SessionEvent { session, event } = event;
        if self.active.as_ref().map(|a| a.session.id) != Some(session) {
            tracing::debug!(
                session_id = %session,
                event = ?event,
                "Ignoring event from inactive session"
            );
            return None;
        }

        match event {
            EngineEvent::Started => {
                self.on_start();
                None
            }
            EngineEvent::Result(results) => {
                self.on_result(&results);
                None
            }
            EngineEvent::Error(code) => self.on_error(code),
            EngineEvent::Ended => {
                self.on_end();
                None
            }
        }
    }

    /// Restart the engine for a ticket returned by `handle_event`.
    ///
    /// Does nothing if the session is gone or the ticket was superseded.
    pub fn fire_retry(&mut self, retry: PendingRetry) {
        let Some(active) = self
            .active
            .as_mut()
            .filter(|a| a.session.id == retry.session)
        else {
            tracing::debug!(session_id = %retry.session, "Dropping retry for inactive session");
            return;
        };
        if active.pending_retry != Some(retry.generation) {
            tracing::debug!(session_id = %retry.session, "Dropping superseded retry");
            return;
        }
        active.pending_retry = None;

        if let Err(e) = active.engine.abort() {
            active
                .callbacks
                .debug(&format!("Abort before restart failed: {}", e));
        }
        match active.engine.start() {
            Ok(()) => {
                active.transition(SessionState::Starting);
                active
                    .callbacks
                    .debug("Restarted recognition after network error");
            }
            Err(e) => {
                active
                    .callbacks
                    .debug(&format!("Failed to restart after network error: {}", e));
                let max = self.policy.max_attempts;
                self.fail(SpeechError::NetworkRetryFailed {
                    attempt: retry.attempt,
                    max,
                });
            }
        }
    }

    // -------------------------------------------------------------------------
    // Event reactions
    // -------------------------------------------------------------------------

    fn on_start(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        active.callbacks.debug("Speech recognition started");
        active.result_received = false;
        if active.pending_retry.take().is_some() {
            active.callbacks.debug("Cancelled pending retry");
        }
        active.transition(SessionState::Listening);
    }

    fn on_result(&mut self, results: &[RecognitionResult]) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if results.is_empty() {
            return;
        }

        let text = final_transcript(results);
        if text.is_empty() {
            return;
        }

        active
            .callbacks
            .debug(&format!("Final transcript: \"{}\"", text));
        active.callbacks.result(&text);
        active.result_received = true;
        self.retries.reset();
    }

    fn on_error(&mut self, code: ErrorCode) -> Option<PendingRetry> {
        self.debug(&format!("Speech recognition error: {}", code));

        match code {
            ErrorCode::Network => self.on_network_error(),
            ErrorCode::NoSpeech => {
                self.debug("No speech detected");
                None
            }
            ErrorCode::Aborted => {
                self.debug("Speech recognition was aborted");
                None
            }
            ErrorCode::AudioCapture => {
                self.fail(SpeechError::AudioCapture);
                None
            }
            ErrorCode::NotAllowed => {
                self.fail(SpeechError::PermissionDenied);
                None
            }
            other => {
                self.fail(SpeechError::Engine(other));
                None
            }
        }
    }

    fn on_network_error(&mut self) -> Option<PendingRetry> {
        if self.capabilities.is_local_development() {
            self.fail(SpeechError::NetworkLocalDevelopment);
            return None;
        }

        let attempt = self.retries.increment();
        let max = self.policy.max_attempts;
        self.debug(&format!("Network error (attempt {}/{})", attempt, max));

        if !self.policy.allows(attempt) {
            self.retries.reset();
            self.fail(SpeechError::NetworkExhausted);
            return None;
        }

        self.next_ticket += 1;
        let generation = self.next_ticket;
        let delay = self.policy.delay;
        let active = self.active.as_mut()?;
        active.callbacks.debug("Waiting before retry...");
        active.pending_retry = Some(generation);
        active.transition(SessionState::Erroring);

        Some(PendingRetry {
            session: active.session.id,
            attempt,
            delay,
            generation,
        })
    }

    fn on_end(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        active.callbacks.debug("Speech recognition ended");
        if active.pending_retry.is_some() {
            return;
        }
        if !active.result_received {
            active.callbacks.debug("No results received in this session");
        }
        active.transition(SessionState::Idle);
        active.callbacks.ended();
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn debug(&mut self, message: &str) {
        if let Some(active) = self.active.as_mut() {
            active.callbacks.debug(message);
        }
    }

    /// Report a terminal error and drop the active session.
    fn fail(&mut self, err: SpeechError) {
        if let Some(mut active) = self.active.take() {
            active.callbacks.error(&err);
            tracing::info!(
                session_id = %active.session.id,
                "Speech recognition session ended after error"
            );
        }
    }
}

/// Space-joined, trimmed text of every final slot.
fn final_transcript(results: &[RecognitionResult]) -> String {
    results
        .iter()
        .filter(|r| r.is_final)
        .map(|r| r.transcript.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

fn reject(callbacks: &mut SessionCallbacks, err: SpeechError) -> bool {
    callbacks.debug(&format!("Error starting speech recognition: {}", err));
    callbacks.error(&err);
    false
}

fn reject_start(callbacks: &mut SessionCallbacks, failure: EngineFailure) -> bool {
    callbacks.debug(&format!("Error starting speech recognition: {}", failure));
    let err = SpeechError::StartFailed(failure);
    callbacks.error(&err);
    false
}

/// Best-effort stop and abort of a superseded session. Errors are discarded.
fn teardown(mut previous: ActiveSession, callbacks: &mut SessionCallbacks) {
    let _ = previous.engine.stop();
    let _ = previous.engine.abort();
    callbacks.debug(&format!(
        "Tore down previous session {}",
        previous.session.id
    ));
}

fn emit(on_debug: &mut Option<&mut dyn FnMut(&str)>, message: &str) {
    tracing::debug!("{}", message);
    if let Some(on_debug) = on_debug {
        on_debug(message);
    }
}

// =============================================================================
// Tests
// =============================================================================
