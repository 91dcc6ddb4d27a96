//! Driving port for user mutations.
//!
//! Inbound adapters call this port with raw request input; validation
//! happens behind it.

use async_trait::async_trait;

use crate::domain::{Error, UserProfile};

/// Unvalidated input for creating a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCommand: Send + Sync {
    /// Register a user.
    ///
    /// Fails with `BAD_REQUEST` when name or email is blank and with
    /// `UNPROCESSABLE` when the email is already registered.
    async fn create_user(&self, request: CreateUserRequest) -> Result<UserProfile, Error>;
}
