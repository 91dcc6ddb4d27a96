//! Generic persistence contract shared by every entity store.
//!
//! Adapters implement [`Repository`] once per storage technology and bind it
//! to concrete entities. Every operation reports failures as domain
//! [`Error`] values so callers never see storage-specific error types.

use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::define_port_error;
use crate::domain::Error;

/// Partial update keyed by field name.
pub type FieldUpdates = Map<String, Value>;

/// A persistable record with a store-assigned identifier.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Identifier type assigned by the store.
    type Id: Clone + fmt::Debug + fmt::Display + Send + Sync + 'static;
    /// Unsaved input from which the store creates a record.
    type Draft: Send + Sync + 'static;

    /// Identifier of the persisted record.
    fn id(&self) -> &Self::Id;
}

define_port_error! {
    /// Rejections raised while decoding a [`FieldUpdates`] map.
    pub enum FieldUpdateError {
        /// The map names a field the entity does not have.
        UnknownField { field: String } => BadRequest, "unknown field `{field}`",
        /// The value has the wrong JSON type for the field.
        InvalidValue { field: String, expected: String } => BadRequest, "field `{field}` must be {expected}",
        /// The value is blank where content is required.
        EmptyValue { field: String } => BadRequest, "field `{field}` must not be empty",
    }
}

/// Entity-agnostic store contract.
///
/// ## Failure modes
/// - `get_by_id` and `update_by_id` fail with `NOT_FOUND` for unknown ids.
/// - Uniqueness violations surface as `UNPROCESSABLE`.
/// - Malformed field updates surface as `BAD_REQUEST`.
/// - Anything else is `INTERNAL` with the underlying cause in metadata.
#[async_trait]
pub trait Repository<E, Id>: Send + Sync
where
    E: Entity<Id = Id>,
    Id: Clone + fmt::Debug + fmt::Display + Send + Sync + 'static,
{
    /// Persist a new entity. The store assigns id and timestamps.
    async fn add(&self, draft: E::Draft) -> Result<E, Error>;

    /// Fetch an entity by id.
    async fn get_by_id(&self, id: &Id) -> Result<E, Error>;

    /// Apply a partial update and return the refreshed entity. An empty map
    /// returns the entity unchanged.
    async fn update_by_id(&self, id: &Id, updates: FieldUpdates) -> Result<E, Error>;

    /// Remove an entity. Deleting a missing id succeeds.
    async fn delete_by_id(&self, id: &Id) -> Result<(), Error>;

    /// Remove every entity of this type.
    async fn delete_all(&self) -> Result<(), Error>;
}
