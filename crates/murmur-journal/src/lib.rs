//! Murmur Journal crate - the journal page model.
//!
//! Composes a transcript buffer, the voice input control and an entry list,
//! persisting through the `EntryService` trait. `RepositoryEntryService` is
//! the SQLite-backed implementation scoped to one user; the HTTP server uses
//! it as well.

pub mod buffer;
pub mod page;
pub mod service;

pub use buffer::TranscriptBuffer;
pub use page::{EditDraft, JournalPage};
pub use service::{EntryService, RepositoryEntryService};
