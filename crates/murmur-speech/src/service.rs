//! Async driver for the session controller.
//!
//! `SpeechService` owns the controller behind a mutex and runs a pump task that
//! feeds engine events into it. Network-error retries are scheduled as delayed
//! tasks; each one calls back into the controller, which decides whether the
//! ticket is still current.
//!
//! Callbacks run while the controller lock is held and must not call back into
//! the service.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use crate::callbacks::SessionCallbacks;
use crate::controller::SpeechSessionController;
use crate::engine::SessionEvent;
use crate::retry::PendingRetry;
use crate::state::SessionState;

/// Shared handle to a running controller.
pub struct SpeechService {
    controller: Arc<Mutex<SpeechSessionController>>,
    pump: JoinHandle<()>,
}

impl SpeechService {
    /// Spawn the event pump on the current tokio runtime.
    pub fn spawn(
        controller: SpeechSessionController,
        events: UnboundedReceiver<SessionEvent>,
    ) -> Self {
        let controller = Arc::new(Mutex::new(controller));
        let pump = tokio::spawn(pump(Arc::clone(&controller), events));
        tracing::debug!("Speech event pump started");
        Self { controller, pump }
    }

    pub fn start(&self, callbacks: SessionCallbacks) -> bool {
        lock(&self.controller).start(callbacks)
    }

    pub fn stop(&self) {
        lock(&self.controller).stop(None);
    }

    /// Stop, reporting teardown diagnostics to `on_debug`.
    pub fn stop_with_debug(&self, mut on_debug: impl FnMut(&str)) {
        lock(&self.controller).stop(Some(&mut on_debug));
    }

    pub fn supports_recognition(&self) -> bool {
        lock(&self.controller).supports_recognition()
    }

    pub fn state(&self) -> SessionState {
        lock(&self.controller).state()
    }

    pub fn is_active(&self) -> bool {
        lock(&self.controller).is_active()
    }

    pub fn retry_count(&self) -> u32 {
        lock(&self.controller).retry_count()
    }
}

impl Drop for SpeechService {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

fn lock(controller: &Mutex<SpeechSessionController>) -> MutexGuard<'_, SpeechSessionController> {
    controller.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn pump(
    controller: Arc<Mutex<SpeechSessionController>>,
    mut events: UnboundedReceiver<SessionEvent>,
) {
    while let Some(event) = events.recv().await {
        let retry = lock(&controller).handle_event(event);
        if let Some(retry) = retry {
            schedule_retry(Arc::clone(&controller), retry);
        }
    }
    tracing::debug!("Speech event pump stopped");
}

fn schedule_retry(controller: Arc<Mutex<SpeechSessionController>>, retry: PendingRetry) {
    tracing::debug!(
        session_id = %retry.session,
        attempt = retry.attempt,
        delay_ms = retry.delay.as_millis() as u64,
        "Scheduling recognition restart"
    );
    tokio::spawn(async move {
        tokio::time::sleep(retry.delay).await;
        lock(&controller).fire_retry(retry);
    });
}

// =============================================================================
// Tests
// =============================================================================
