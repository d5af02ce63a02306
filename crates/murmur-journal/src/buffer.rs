//! The text the user is composing.

/// Typed text plus dictated fragments.
///
/// Dictated fragments are appended with a single separating space; typed text
/// replaces the buffer wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptBuffer {
    text: String,
}

impl TranscriptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Replace the buffer with typed text.
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Append a finalized transcript fragment.
    pub fn append_transcript(&mut self, fragment: &str) {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return;
        }
        let prev = self.text.trim_end();
        self.text = if prev.is_empty() {
            fragment.to_string()
        } else {
            format!("{} {}", prev, fragment)
        };
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}
