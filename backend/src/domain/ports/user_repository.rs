//! Port abstraction for user persistence adapters.
use async_trait::async_trait;

use super::Repository;
use crate::domain::{Error, User, UserId};

/// User store: the generic contract plus lookups by natural key.
#[async_trait]
pub trait UserRepository: Repository<User, UserId> {
    /// Find the user registered with `email`, if any.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error>;
}


#[cfg(test)]
pub use mock::MockUserRepository;
