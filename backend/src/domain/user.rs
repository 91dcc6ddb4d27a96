//! User data model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::ports::{Entity, FieldUpdateError, FieldUpdates};

/// Validation errors for user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyName,
    EmptyEmail,
    InvalidId,
    /// Numeric, but beyond any identifier the store can assign.
    IdOutOfRange,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidId => write!(f, "user id must be a positive integer"),
            Self::IdOutOfRange => write!(f, "user id is outside the stored range"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Store-assigned user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i32);

impl UserId {
    /// Wrap a raw identifier.
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// The raw integer value.
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = UserValidationError;

    /// Parse a path segment. Only plain decimal digits that fit in a `u64`
    /// are accepted; values above `i32::MAX` parse but can never match a
    /// stored row.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(UserValidationError::InvalidId);
        }
        let wide = s
            .parse::<u64>()
            .map_err(|_| UserValidationError::InvalidId)?;
        i32::try_from(wide)
            .map(Self)
            .map_err(|_| UserValidationError::IdOutOfRange)
    }
}

/// Persisted user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a user. The store assigns id and
/// timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

impl NewUser {
    /// Trim and validate raw input.
    ///
    /// # Examples
    /// ```
    /// use users_api::domain::{NewUser, UserValidationError};
    ///
    /// let draft = NewUser::try_new(" Ana ", "ana@example.com").expect("valid");
    /// assert_eq!(draft.name, "Ana");
    /// assert_eq!(
    ///     NewUser::try_new("", "ana@example.com"),
    ///     Err(UserValidationError::EmptyName)
    /// );
    /// ```
    pub fn try_new(
        name: impl AsRef<str>,
        email: impl AsRef<str>,
    ) -> Result<Self, UserValidationError> {
        let name = name.as_ref().trim();
        let email = email.as_ref().trim();
        if name.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if email.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        Ok(Self {
            name: name.to_owned(),
            email: email.to_owned(),
        })
    }
}

impl Entity for User {
    type Id = UserId;
    type Draft = NewUser;

    fn id(&self) -> &UserId {
        &self.id
    }
}

/// Outward view of a user returned by the use cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Typed partial update decoded from a [`FieldUpdates`] map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserChanges {
    /// True when the update touches no field.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }

    /// Apply the changes to an in-memory record.
    pub fn apply_to(self, user: &mut User, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        user.updated_at = now;
    }
}

fn non_empty_string(field: &str, value: &Value) -> Result<String, FieldUpdateError> {
    let text = value
        .as_str()
        .ok_or_else(|| FieldUpdateError::invalid_value(field, "a string"))?
        .trim();
    if text.is_empty() {
        return Err(FieldUpdateError::empty_value(field));
    }
    Ok(text.to_owned())
}

impl TryFrom<&FieldUpdates> for UserChanges {
    type Error = FieldUpdateError;

    fn try_from(updates: &FieldUpdates) -> Result<Self, Self::Error> {
        let mut changes = Self::default();
        for (field, value) in updates {
            match field.as_str() {
                "name" => changes.name = Some(non_empty_string(field, value)?),
                "email" => changes.email = Some(non_empty_string(field, value)?),
                other => return Err(FieldUpdateError::unknown_field(other)),
            }
        }
        Ok(changes)
    }
}
