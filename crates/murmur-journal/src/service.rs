//! Entry persistence for one authenticated user.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use murmur_core::config::JournalConfig;
use murmur_core::error::MurmurError;
use murmur_core::types::JournalEntry;
use murmur_storage::{Database, JournalRepository};

/// List, create and update entries on behalf of one user.
#[async_trait]
pub trait EntryService: Send + Sync {
    /// The user's entries, newest first.
    async fn list(&self) -> Result<Vec<JournalEntry>, MurmurError>;

    async fn get(&self, id: Uuid) -> Result<JournalEntry, MurmurError>;

    async fn create(&self, content: &str) -> Result<JournalEntry, MurmurError>;

    async fn update(&self, id: Uuid, content: &str) -> Result<JournalEntry, MurmurError>;
}

/// `EntryService` over the SQLite repository.
///
/// Content must be non-blank and within `max_entry_bytes`. Entries owned by
/// another user yield `NotOwner`; missing ones `EntryNotFound`.
pub struct RepositoryEntryService {
    entries: JournalRepository,
    user_id: Uuid,
    max_entry_bytes: usize,
    list_limit: u64,
}

impl RepositoryEntryService {
    pub fn new(db: Arc<Database>, user_id: Uuid, config: &JournalConfig) -> Self {
        Self {
            entries: JournalRepository::new(db),
            user_id,
            max_entry_bytes: config.max_entry_bytes,
            list_limit: config.list_limit,
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    fn validate(&self, content: &str) -> Result<(), MurmurError> {
        if content.trim().is_empty() {
            return Err(MurmurError::InvalidContent("Content is required".to_string()));
        }
        if content.len() > self.max_entry_bytes {
            return Err(MurmurError::InvalidContent(format!(
                "Content exceeds {} bytes",
                self.max_entry_bytes
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl EntryService for RepositoryEntryService {
    async fn list(&self) -> Result<Vec<JournalEntry>, MurmurError> {
        self.entries.list_for_user(self.user_id, self.list_limit)
    }

    async fn get(&self, id: Uuid) -> Result<JournalEntry, MurmurError> {
        let entry = self
            .entries
            .find_by_id(id)?
            .ok_or_else(|| MurmurError::EntryNotFound { id: id.to_string() })?;
        if !entry.is_owned_by(self.user_id) {
            return Err(MurmurError::NotOwner { id: id.to_string() });
        }
        Ok(entry)
    }

    async fn create(&self, content: &str) -> Result<JournalEntry, MurmurError> {
        self.validate(content)?;
        let entry = JournalEntry::new(self.user_id, content);
        self.entries.create(&entry)?;
        tracing::info!(entry_id = %entry.id, user_id = %self.user_id, "Journal entry created");
        Ok(entry)
    }

    async fn update(&self, id: Uuid, content: &str) -> Result<JournalEntry, MurmurError> {
        self.validate(content)?;
        self.get(id).await?;
        let entry = self.entries.update_content(id, content)?;
        tracing::info!(entry_id = %id, user_id = %self.user_id, "Journal entry updated");
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_core::types::User;
    use murmur_storage::UserRepository;

    fn setup() -> (Arc<Database>, User, User) {
        let db = Arc::new(Database::in_memory().unwrap());
        let users = UserRepository::new(Arc::clone(&db));
        let ada = User::new("ada");
        let grace = User::new("grace");
        users.create(&ada, "ada-token").unwrap();
        users.create(&grace, "grace-token").unwrap();
        (db, ada, grace)
    }

    fn service(db: &Arc<Database>, user: &User) -> RepositoryEntryService {
        RepositoryEntryService::new(Arc::clone(db), user.id, &JournalConfig::default())
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let (db, ada, _) = setup();
        let svc = service(&db, &ada);

        let entry = svc.create("Went for a run").await.unwrap();
        assert_eq!(entry.user_id, ada.id);

        let entries = svc.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, entry.id);
    }

    #[tokio::test]
    async fn test_blank_content_rejected() {
        let (db, ada, _) = setup();
        let svc = service(&db, &ada);

        for content in ["", "   ", "\n"] {
            let err = svc.create(content).await.unwrap_err();
            assert!(matches!(err, MurmurError::InvalidContent(_)));
        }
        assert!(svc.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_content_rejected() {
        let (db, ada, _) = setup();
        let config = JournalConfig {
            max_entry_bytes: 8,
            ..JournalConfig::default()
        };
        let svc = RepositoryEntryService::new(db, ada.id, &config);
        let err = svc.create("far too long").await.unwrap_err();
        assert!(err.to_string().contains("exceeds 8 bytes"));
    }

    #[tokio::test]
    async fn test_other_users_entries_are_hidden() {
        let (db, ada, grace) = setup();
        let entry = service(&db, &ada).create("mine").await.unwrap();
        let theirs = service(&db, &grace);

        assert!(theirs.list().await.unwrap().is_empty());
        assert!(matches!(
            theirs.get(entry.id).await.unwrap_err(),
            MurmurError::NotOwner { .. }
        ));
        assert!(matches!(
            theirs.update(entry.id, "hijacked").await.unwrap_err(),
            MurmurError::NotOwner { .. }
        ));
        assert_eq!(service(&db, &ada).get(entry.id).await.unwrap().content, "mine");
    }

    #[tokio::test]
    async fn test_update() {
        let (db, ada, _) = setup();
        let svc = service(&db, &ada);
        let entry = svc.create("first draft").await.unwrap();

        let updated = svc.update(entry.id, "second draft").await.unwrap();
        assert_eq!(updated.content, "second draft");
        assert_eq!(svc.get(entry.id).await.unwrap().content, "second draft");
    }

    #[tokio::test]
    async fn test_update_validates_before_lookup() {
        let (db, ada, _) = setup();
        let svc = service(&db, &ada);

        let err = svc.update(Uuid::new_v4(), "").await.unwrap_err();
        assert!(matches!(err, MurmurError::InvalidContent(_)));
        let err = svc.update(Uuid::new_v4(), "text").await.unwrap_err();
        assert!(matches!(err, MurmurError::EntryNotFound { .. }));
    }
}
