//! Journal page model.
//!
//! Holds the composing buffer, the voice input control that dictates into
//! it, the user's entry list and at most one in-place edit. Failures are
//! kept as a single user-facing error line.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use murmur_core::config::SpeechConfig;
use murmur_core::error::MurmurError;
use murmur_core::types::JournalEntry;
use murmur_speech::{
    InputMode, MicrophoneProbe, PointerInput, SpeechBackend, TranscriptFn, VoiceInputControl,
};

use crate::buffer::TranscriptBuffer;
use crate::service::EntryService;

pub const EMPTY_CONTENT: &str = "Please enter some content for your journal entry";
pub const SAVE_FAILED: &str = "Failed to save journal entry. Please try again.";
pub const UPDATE_FAILED: &str = "Failed to update journal entry. Please try again.";
pub const LOAD_FAILED: &str = "Failed to load journal entries. Please try again.";
pub const VOICE_FAILED: &str = "Voice recognition failed. Please try again.";

/// Draft text for an entry being edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    pub entry_id: Uuid,
    pub content: String,
}

fn lock(buffer: &Mutex<TranscriptBuffer>) -> MutexGuard<'_, TranscriptBuffer> {
    buffer.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct JournalPage<S, B> {
    service: S,
    voice: VoiceInputControl<B>,
    content: Arc<Mutex<TranscriptBuffer>>,
    entries: Vec<JournalEntry>,
    editing: Option<EditDraft>,
    error: Option<&'static str>,
}

impl<S: EntryService, B: SpeechBackend> JournalPage<S, B> {
    pub fn new(service: S, backend: B, mode: InputMode) -> Self {
        let content = Arc::new(Mutex::new(TranscriptBuffer::new()));
        let sink = Arc::clone(&content);
        let on_transcript: TranscriptFn =
            Arc::new(move |text: &str| lock(&sink).append_transcript(text));

        Self {
            service,
            voice: VoiceInputControl::new(backend, mode, on_transcript),
            content,
            entries: Vec::new(),
            editing: None,
            error: None,
        }
    }

    /// Build a page whose voice debug log holds `speech.debug_log_capacity` lines.
    pub fn from_config(service: S, backend: B, mode: InputMode, speech: &SpeechConfig) -> Self {
        Self::new(service, backend, mode).with_debug_capacity(speech.debug_log_capacity)
    }

    /// Keep at most `capacity` voice debug lines.
    pub fn with_debug_capacity(mut self, capacity: usize) -> Self {
        self.voice = self.voice.with_debug_capacity(capacity);
        self
    }

    /// Probe for a microphone and load the entry list.
    pub async fn mount(&mut self, probe: &dyn MicrophoneProbe) {
        self.voice.mount(probe);
        // A failed load is already recorded in `error`.
        let _ = self.refresh().await;
    }

    pub fn voice(&self) -> &VoiceInputControl<B> {
        &self.voice
    }

    pub fn voice_input(&mut self, input: PointerInput) -> bool {
        self.voice.handle_input(input)
    }

    pub fn content(&self) -> String {
        lock(&self.content).as_str().to_string()
    }

    /// Replace the composing text with what the user typed.
    pub fn set_content(&self, text: impl Into<String>) {
        lock(&self.content).set(text);
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn editing(&self) -> Option<&EditDraft> {
        self.editing.as_ref()
    }

    /// The error line to show, if any. Voice failures show a generic message.
    pub fn error(&self) -> Option<&'static str> {
        self.error
            .or_else(|| self.voice.view().error.map(|_| VOICE_FAILED))
    }

    fn clear_errors(&mut self) {
        self.error = None;
        self.voice.clear_error();
    }

    /// Reload the entry list.
    pub async fn refresh(&mut self) -> Result<(), MurmurError> {
        match self.service.list().await {
            Ok(entries) => {
                self.entries = entries;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load journal entries");
                self.error = Some(LOAD_FAILED);
                Err(e)
            }
        }
    }

    /// Save the composing text as a new entry.
    ///
    /// Returns whether an entry was created. On success the buffer is cleared
    /// and the list reloaded.
    pub async fn submit(&mut self) -> bool {
        self.clear_errors();

        let content = {
            let buffer = lock(&self.content);
            if buffer.is_blank() {
                self.error = Some(EMPTY_CONTENT);
                return false;
            }
            buffer.as_str().to_string()
        };

        match self.service.create(&content).await {
            Ok(entry) => {
                tracing::debug!(entry_id = %entry.id, "Journal entry submitted");
                lock(&self.content).clear();
                if self.refresh().await.is_err() {
                    self.entries.insert(0, entry);
                }
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save journal entry");
                self.error = Some(SAVE_FAILED);
                false
            }
        }
    }

    /// Start editing `id`, discarding any other draft. Returns false if the
    /// entry is not in the list.
    pub fn begin_edit(&mut self, id: Uuid) -> bool {
        let Some(entry) = self.entries.iter().find(|e| e.id == id) else {
            return false;
        };
        self.editing = Some(EditDraft {
            entry_id: id,
            content: entry.content.clone(),
        });
        true
    }

    pub fn edit_draft(&mut self, text: impl Into<String>) {
        if let Some(draft) = self.editing.as_mut() {
            draft.content = text.into();
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Commit the draft. The list row is replaced with the stored entry.
    pub async fn save_edit(&mut self) -> bool {
        let Some(draft) = self.editing.clone() else {
            return false;
        };
        self.clear_errors();
        if draft.content.trim().is_empty() {
            self.error = Some(EMPTY_CONTENT);
            return false;
        }

        match self.service.update(draft.entry_id, &draft.content).await {
            Ok(updated) => {
                if let Some(row) = self.entries.iter_mut().find(|e| e.id == updated.id) {
                    *row = updated;
                }
                self.editing = None;
                true
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    entry_id = %draft.entry_id,
                    "Failed to update journal entry"
                );
                self.error = Some(UPDATE_FAILED);
                false
            }
        }
    }
}

impl<S, B> std::fmt::Debug for JournalPage<S, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JournalPage")
            .field("entries", &self.entries.len())
            .field("editing", &self.editing)
            .field("error", &self.error)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
