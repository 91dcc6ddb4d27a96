//! Driving port for user lookups.

use async_trait::async_trait;

use crate::domain::{Error, UserId, UserProfile};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserQuery: Send + Sync {
    /// Fetch one user. Fails with `NOT_FOUND` for unknown ids.
    async fn get_user(&self, id: UserId) -> Result<UserProfile, Error>;
}
