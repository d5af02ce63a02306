//! Append-only diagnostic log shown next to the voice control.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugEntry {
    pub at: DateTime<Utc>,
    pub message: String,
}

impl DebugEntry {
    /// `[HH:MM:SS] message`
    pub fn line(&self) -> String {
        format!("[{}] {}", self.at.format("%H:%M:%S"), self.message)
    }
}

/// Ordered timestamped messages. With a capacity, the oldest lines are dropped.
#[derive(Debug, Clone, Default)]
pub struct DebugLog {
    entries: VecDeque<DebugEntry>,
    capacity: Option<usize>,
}

impl DebugLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: Some(capacity),
        }
    }

    pub fn push(&mut self, message: impl Into<String>) {
        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                return;
            }
            while self.entries.len() >= capacity {
                self.entries.pop_front();
            }
        }
        self.entries.push_back(DebugEntry {
            at: Utc::now(),
            message: message.into(),
        });
    }

    pub fn entries(&self) -> impl Iterator<Item = &DebugEntry> {
        self.entries.iter()
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(DebugEntry::line).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
