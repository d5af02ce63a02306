//! Recognition session data.

use std::fmt;

use chrono::{DateTime, Utc};
use murmur_core::error::MurmurError;

use crate::state::SessionState;

/// Identifier of one recognition session. Monotonic per controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Engine configuration chosen at session start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionConfig {
    /// Locale tag, e.g. `en-US`.
    pub language: String,
    /// Keep listening across natural pauses.
    pub continuous: bool,
    /// Deliver interim (revisable) results.
    pub interim_results: bool,
    /// Alternatives requested per utterance.
    pub max_alternatives: u32,
}

impl RecognitionConfig {
    /// Configuration for the given environment.
    ///
    /// Continuous mode is unreliable on local-development hosts, so those get
    /// single-shot recognition with final results only.
    pub fn for_environment(language: &str, local_development: bool) -> Self {
        Self {
            language: language.to_string(),
            continuous: !local_development,
            interim_results: !local_development,
            max_alternatives: 1,
        }
    }
}

/// One lifecycle instance of the recognition engine.
#[derive(Debug, Clone)]
pub struct RecognitionSession {
    pub id: SessionId,
    pub config: RecognitionConfig,
    pub started_at: DateTime<Utc>,
    state: SessionState,
}

impl RecognitionSession {
    pub fn new(id: SessionId, config: RecognitionConfig) -> Self {
        Self {
            id,
            config,
            started_at: Utc::now(),
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn transition(&mut self, target: SessionState) -> Result<(), MurmurError> {
        self.state.transition(target)
    }

    /// Elapsed time since the session was created, in seconds.
    pub fn elapsed_secs(&self) -> f32 {
        let elapsed = Utc::now() - self.started_at;
        elapsed.num_milliseconds() as f32 / 1000.0
    }
}
