//! Callbacks supplied by the caller of `start`.

use std::fmt;

use crate::error::SpeechError;

pub type ResultFn = Box<dyn FnMut(&str) + Send>;
pub type ErrorFn = Box<dyn FnMut(&SpeechError) + Send>;
pub type DebugFn = Box<dyn FnMut(&str) + Send>;
pub type EndFn = Box<dyn FnMut() + Send>;

/// Receivers for one recording attempt.
///
/// `on_result` gets finalized, trimmed transcript fragments only. `on_error`
/// gets each user-facing failure exactly once. `on_debug` gets diagnostics and
/// is optional; its absence changes nothing. `on_end` fires when the engine
/// ends on its own with no restart pending.
pub struct SessionCallbacks {
    on_result: ResultFn,
    on_error: Option<ErrorFn>,
    on_debug: Option<DebugFn>,
    on_end: Option<EndFn>,
}

impl SessionCallbacks {
    pub fn new(on_result: impl FnMut(&str) + Send + 'static) -> Self {
        Self {
            on_result: Box::new(on_result),
            on_error: None,
            on_debug: None,
            on_end: None,
        }
    }

    pub fn on_error(mut self, on_error: impl FnMut(&SpeechError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(on_error));
        self
    }

    pub fn on_debug(mut self, on_debug: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_debug = Some(Box::new(on_debug));
        self
    }

    pub fn on_end(mut self, on_end: impl FnMut() + Send + 'static) -> Self {
        self.on_end = Some(Box::new(on_end));
        self
    }

    pub(crate) fn result(&mut self, text: &str) {
        (self.on_result)(text);
    }

    pub(crate) fn error(&mut self, err: &SpeechError) {
        tracing::warn!(error = %err, "Speech recognition failed");
        if let Some(on_error) = self.on_error.as_mut() {
            on_error(err);
        }
    }

    pub(crate) fn debug(&mut self, message: &str) {
        tracing::debug!("{}", message);
        if let Some(on_debug) = self.on_debug.as_mut() {
            on_debug(message);
        }
    }

    pub(crate) fn ended(&mut self) {
        if let Some(on_end) = self.on_end.as_mut() {
            on_end();
        }
    }
}

impl fmt::Debug for SessionCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCallbacks")
            .field("has_on_error", &self.on_error.is_some())
            .field("has_on_debug", &self.on_debug.is_some())
            .field("has_on_end", &self.on_end.is_some())
            .finish()
    }
}
