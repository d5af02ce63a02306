//! Boundary to the underlying speech recognition engine.
//!
//! An engine exposes `start`, `stop` and `abort` primitives and reports
//! `start`, `result`, `error` and `end` events asynchronously through the
//! `EventSink` it was created with. Every event is tagged with the id of the
//! session that produced it, so the controller can drop events from a
//! superseded session.

use std::fmt;

use tokio::sync::mpsc::UnboundedSender;

use crate::session::{RecognitionConfig, SessionId};

/// One result slot reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionResult {
    /// Transcript of the best alternative.
    pub transcript: String,
    /// Whether the engine guarantees this transcript will not change.
    pub is_final: bool,
}

impl RecognitionResult {
    pub fn interim(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: false,
        }
    }

    pub fn final_text(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: true,
        }
    }
}

/// Error codes reported by the engine's `error` event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Network,
    NoSpeech,
    AudioCapture,
    NotAllowed,
    Aborted,
    Other(String),
}

impl ErrorCode {
    /// Parse the engine's wire code. Unknown codes are kept verbatim.
    pub fn from_code(code: &str) -> Self {
        match code {
            "network" => ErrorCode::Network,
            "no-speech" => ErrorCode::NoSpeech,
            "audio-capture" => ErrorCode::AudioCapture,
            "not-allowed" => ErrorCode::NotAllowed,
            "aborted" => ErrorCode::Aborted,
            other => ErrorCode::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::Network => "network",
            ErrorCode::NoSpeech => "no-speech",
            ErrorCode::AudioCapture => "audio-capture",
            ErrorCode::NotAllowed => "not-allowed",
            ErrorCode::Aborted => "aborted",
            ErrorCode::Other(code) => code,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event delivered by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The engine began capturing audio.
    Started,
    /// All result slots collected so far in this session.
    Result(Vec<RecognitionResult>),
    /// The engine reported an error.
    Error(ErrorCode),
    /// The engine stopped delivering events for this run.
    Ended,
}

/// An engine event tagged with the session that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub session: SessionId,
    pub event: EngineEvent,
}

/// Failure raised synchronously by an engine primitive or by engine construction.
///
/// The platform distinguishes a few causes; everything else lands in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineFailure {
    /// Microphone permission refused.
    NotAllowed,
    /// No capture device present.
    NotFound,
    /// Device present but cannot be opened (busy or broken).
    NotReadable,
    /// Anything the platform does not classify.
    Other(String),
}

impl fmt::Display for EngineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineFailure::NotAllowed => write!(f, "NotAllowedError"),
            EngineFailure::NotFound => write!(f, "NotFoundError"),
            EngineFailure::NotReadable => write!(f, "NotReadableError"),
            EngineFailure::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for EngineFailure {}

/// Handle to a running recognition engine instance.
pub trait RecognitionEngine: Send {
    fn start(&mut self) -> Result<(), EngineFailure>;
    fn stop(&mut self) -> Result<(), EngineFailure>;
    fn abort(&mut self) -> Result<(), EngineFailure>;
}

/// Creates engine instances configured for one session.
pub trait EngineFactory: Send {
    fn create(
        &mut self,
        config: &RecognitionConfig,
        events: EventSink,
    ) -> Result<Box<dyn RecognitionEngine>, EngineFailure>;
}

/// Channel end an engine uses to report its events.
#[derive(Debug, Clone)]
pub struct EventSink {
    session: SessionId,
    tx: UnboundedSender<SessionEvent>,
}

impl EventSink {
    pub fn new(session: SessionId, tx: UnboundedSender<SessionEvent>) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Deliver an event. Returns false once the controller side is gone.
    pub fn emit(&self, event: EngineEvent) -> bool {
        self.tx
            .send(SessionEvent {
                session: self.session,
                event,
            })
            .is_ok()
    }
}
