//! User use cases.
//!
//! [`UserService`] implements the [`UserCommand`] and [`UserQuery`] driving
//! ports on top of any [`UserRepository`]. Each operation runs in its own
//! correlated span and logs its outcome.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{Span, error, info, warn};

use crate::correlated_span;
use crate::domain::ports::{CreateUserRequest, UserCommand, UserQuery, UserRepository};
use crate::domain::{Error, NewUser, UserId, UserProfile};
use crate::observability::in_span;

/// User service implementing the driving ports.
pub struct UserService<R: ?Sized> {
    users: Arc<R>,
}

impl<R: ?Sized> UserService<R> {
    pub fn new(users: Arc<R>) -> Self {
        Self { users }
    }
}

impl<R: ?Sized> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
        }
    }
}

fn log_failure(err: &Error, context: &'static str) {
    if err.is_reportable() {
        error!(code = %err.code(), error = %err.message(), "{context}");
    } else {
        warn!(code = %err.code(), error = %err.message(), "{context}");
    }
}

impl<R> UserService<R>
where
    R: UserRepository + ?Sized,
{
    async fn create(&self, request: CreateUserRequest) -> Result<UserProfile, Error> {
        let draft = NewUser::try_new(&request.name, &request.email).map_err(|reason| {
            warn!(%reason, "user validation failed");
            Error::bad_request("Name and email are required")
        })?;

        let existing = self
            .users
            .find_by_email(&draft.email)
            .await
            .inspect_err(|err| log_failure(err, "email lookup failed"))?;
        if existing.is_some() {
            warn!(email = %draft.email, "email already in use");
            return Err(Error::unprocessable("Email already in use").with_meta("email", draft.email));
        }

        let created = self
            .users
            .add(draft)
            .await
            .inspect_err(|err| log_failure(err, "user creation failed"))?;
        Span::current().record("user.id", created.id.get());
        info!(user_id = %created.id, "user created");
        Ok(UserProfile::from(&created))
    }

    async fn fetch(&self, id: UserId) -> Result<UserProfile, Error> {
        let user = self
            .users
            .get_by_id(&id)
            .await
            .inspect_err(|err| log_failure(err, "user lookup failed"))?;
        info!(user_id = %user.id, "user retrieved");
        Ok(UserProfile::from(&user))
    }
}

#[async_trait]
impl<R> UserCommand for UserService<R>
where
    R: UserRepository + ?Sized,
{
    async fn create_user(&self, request: CreateUserRequest) -> Result<UserProfile, Error> {
        let span = correlated_span!(
            "use_case",
            otel.name = "CreateUser",
            user.email = request.email.as_str(),
            user.id = tracing::field::Empty
        );
        in_span(span, self.create(request)).await
    }
}

#[async_trait]
impl<R> UserQuery for UserService<R>
where
    R: UserRepository + ?Sized,
{
    async fn get_user(&self, id: UserId) -> Result<UserProfile, Error> {
        let span = correlated_span!("use_case", otel.name = "GetUser", user.id = id.get());
        in_span(span, self.fetch(id)).await
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
