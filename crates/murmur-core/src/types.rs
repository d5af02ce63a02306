use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single journal entry owned by one user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    /// Unique identifier.
    pub id: Uuid,
    /// Free-text body of the entry.
    pub content: String,
    /// Owner of the entry.
    pub user_id: Uuid,
    /// When the entry was first saved.
    pub created_at: DateTime<Utc>,
    /// When the entry content last changed.
    pub updated_at: DateTime<Utc>,
}

impl JournalEntry {
    /// Create a new entry for `user_id`, stamped with the current time.
    pub fn new(user_id: Uuid, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            user_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns whether `user_id` owns this entry.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// An account allowed to use the journal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}
