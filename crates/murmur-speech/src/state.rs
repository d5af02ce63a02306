//! Recognition session state machine.
//!
//! Valid transitions for one recognition session:
//! - Idle -> Starting (engine start requested)
//! - Starting -> Listening (engine confirmed start)
//! - Starting | Listening -> Erroring (retryable network error, restart pending)
//! - Erroring -> Starting (restart after backoff)
//! - Starting | Listening -> Idle (engine ended on its own)
//! - Idle -> Listening | Erroring (late events from a restarted engine whose
//!   aborted run already reported its end)
//! - Idle | Starting | Listening | Erroring -> Stopping (stop requested)
//! - Stopping -> Idle (teardown complete)

use std::fmt;

use murmur_core::error::MurmurError;

/// Lifecycle state of a recognition session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// No recognition running. Ready to start.
    #[default]
    Idle,
    /// Engine start invoked, waiting for the engine to confirm.
    Starting,
    /// Engine confirmed and is delivering results.
    Listening,
    /// Engine is being stopped.
    Stopping,
    /// A transient error occurred and a restart is pending.
    Erroring,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::Starting => write!(f, "Starting"),
            SessionState::Listening => write!(f, "Listening"),
            SessionState::Stopping => write!(f, "Stopping"),
            SessionState::Erroring => write!(f, "Erroring"),
        }
    }
}

impl SessionState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, target),
            (Idle, Starting)
                | (Starting, Listening)
                | (Starting, Erroring)
                | (Listening, Erroring)
                | (Erroring, Starting)
                | (Starting, Idle)
                | (Listening, Idle)
                | (Idle, Listening)
                | (Idle, Erroring)
                | (Idle, Stopping)
                | (Starting, Stopping)
                | (Listening, Stopping)
                | (Erroring, Stopping)
                | (Stopping, Idle)
        )
    }

    /// Apply a transition, returning an error if it is not permitted.
    pub fn transition(&mut self, target: SessionState) -> Result<(), MurmurError> {
        if self.can_transition_to(&target) {
            tracing::debug!("Recognition state: {} -> {}", self, target);
            *self = target;
            Ok(())
        } else {
            Err(MurmurError::Speech(format!(
                "Invalid state transition: {} -> {}",
                self, target
            )))
        }
    }

    /// Whether the engine is (or is about to be) capturing audio.
    pub fn is_capturing(&self) -> bool {
        matches!(self, SessionState::Starting | SessionState::Listening)
    }
}

// =============================================================================
// Tests
// =============================================================================
