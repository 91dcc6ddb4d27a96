//! In-memory user store used when no database is configured and in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::in_memory_repository::{InMemoryRepository, MemoryRecord};
use crate::domain::ports::{FieldUpdates, UserRepository};
use crate::domain::{Error, NewUser, User, UserChanges, UserId};
use crate::observability::{RepositoryOperation, in_span};

impl MemoryRecord for User {
    type Changes = UserChanges;

    fn materialise(sequence: u64, draft: NewUser, now: DateTime<Utc>) -> Result<Self, Error> {
        let raw = i32::try_from(sequence).map_err(|_| {
            Error::internal("")
                .with_meta("entity", "User")
                .with_meta("cause", "user id sequence exhausted")
        })?;
        Ok(Self {
            id: UserId::new(raw),
            name: draft.name,
            email: draft.email,
            created_at: now,
            updated_at: now,
        })
    }

    fn changes(updates: &FieldUpdates) -> Result<UserChanges, Error> {
        UserChanges::try_from(updates).map_err(Error::from)
    }

    fn is_noop(changes: &UserChanges) -> bool {
        changes.is_empty()
    }

    fn apply(&mut self, changes: UserChanges, now: DateTime<Utc>) {
        changes.apply_to(self, now);
    }

    fn unique_key(&self) -> Option<&str> {
        Some(self.email.as_str())
    }

    fn draft_unique_key(draft: &NewUser) -> Option<&str> {
        Some(draft.email.as_str())
    }

    fn unique_violation(key: &str) -> Error {
        Error::unprocessable("Email already in use").with_meta("email", key)
    }
}

/// In-memory user store.
pub type InMemoryUserRepository = InMemoryRepository<User>;

impl Default for InMemoryRepository<User> {
    fn default() -> Self {
        Self::new("User")
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository<User> {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let span = RepositoryOperation::Lookup("GetByEmail").span("User");
        in_span(span, async { self.find_first(|user| user.email == email) }).await
    }
}
