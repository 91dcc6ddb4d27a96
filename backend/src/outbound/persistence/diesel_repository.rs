//! Generic PostgreSQL repository.
//!
//! [`DieselRepository`] implements the domain [`Repository`] contract once.
//! Entity specifics (table, row mapping, update decoding) come from a
//! [`TableBinding`], so adding an entity means writing a binding rather than
//! another repository.

use std::fmt;
use std::marker::PhantomData;

use async_trait::async_trait;
use diesel::QueryResult;
use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::bb8::PooledConnection;
use tracing::debug;

use super::diesel_error_mapping::map_diesel_error;
use super::pool::DbPool;
use crate::domain::Error;
use crate::domain::ports::{Entity, FieldUpdates, Repository};
use crate::observability::{RepositoryOperation, in_span};

/// Per-entity glue between the generic repository and a Diesel table.
#[async_trait]
pub trait TableBinding: Send + Sync + 'static {
    type Entity: Entity<Id = Self::Id>;
    type Id: Clone + fmt::Debug + fmt::Display + Send + Sync + 'static;
    /// Typed form of a decoded [`FieldUpdates`] map.
    type Changes: Send + Sync;

    /// Entity name used in span names and error messages.
    const ENTITY: &'static str;

    /// Decode and validate a partial update.
    fn changes(updates: &FieldUpdates) -> Result<Self::Changes, Error>;

    /// True when the decoded update touches no column.
    fn is_noop(changes: &Self::Changes) -> bool;

    /// Error reported for a unique-constraint violation.
    fn unique_violation(constraint: Option<&str>) -> Error {
        Error::unprocessable(format!("{} already exists", Self::ENTITY))
            .with_meta("entity", Self::ENTITY)
            .with_meta("constraint", constraint.unwrap_or_default())
    }

    async fn insert(
        conn: &mut AsyncPgConnection,
        draft: &<Self::Entity as Entity>::Draft,
    ) -> QueryResult<Self::Entity>;

    async fn find(conn: &mut AsyncPgConnection, id: &Self::Id) -> QueryResult<Option<Self::Entity>>;

    async fn update(
        conn: &mut AsyncPgConnection,
        id: &Self::Id,
        changes: &Self::Changes,
    ) -> QueryResult<Self::Entity>;

    async fn delete(conn: &mut AsyncPgConnection, id: &Self::Id) -> QueryResult<usize>;

    async fn delete_all(conn: &mut AsyncPgConnection) -> QueryResult<usize>;
}

/// Diesel-backed repository for the entity described by `B`.
pub struct DieselRepository<B> {
    pool: DbPool,
    binding: PhantomData<fn() -> B>,
}

impl<B> Clone for DieselRepository<B> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            binding: PhantomData,
        }
    }
}

impl<B: TableBinding> DieselRepository<B> {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            binding: PhantomData,
        }
    }

    pub(crate) async fn connection(
        &self,
    ) -> Result<PooledConnection<'_, AsyncPgConnection>, Error> {
        self.pool.get().await.map_err(|err| {
            Error::from(err).with_meta("entity", B::ENTITY)
        })
    }

    pub(crate) fn map_error(error: diesel::result::Error) -> Error {
        map_diesel_error(error, B::ENTITY, B::unique_violation)
    }

    fn not_found(id: &B::Id) -> Error {
        Error::not_found(format!("{} not found", B::ENTITY)).with_meta("id", id.to_string())
    }

    async fn load(&self, id: &B::Id) -> Result<B::Entity, Error> {
        let mut conn = self.connection().await?;
        B::find(&mut conn, id)
            .await
            .map_err(Self::map_error)?
            .ok_or_else(|| Self::not_found(id))
    }
}

#[async_trait]
impl<B> Repository<B::Entity, B::Id> for DieselRepository<B>
where
    B: TableBinding,
{
    async fn add(&self, draft: <B::Entity as Entity>::Draft) -> Result<B::Entity, Error> {
        let span = RepositoryOperation::Add.span(B::ENTITY);
        in_span(span, async {
            let mut conn = self.connection().await?;
            let created = B::insert(&mut conn, &draft).await.map_err(Self::map_error)?;
            debug!(id = %created.id(), "row inserted");
            Ok(created)
        })
        .await
    }

    async fn get_by_id(&self, id: &B::Id) -> Result<B::Entity, Error> {
        let span = RepositoryOperation::GetById.span(B::ENTITY);
        in_span(span, self.load(id)).await
    }

    async fn update_by_id(&self, id: &B::Id, updates: FieldUpdates) -> Result<B::Entity, Error> {
        let span = RepositoryOperation::UpdateById.span(B::ENTITY);
        in_span(span, async {
            let changes = B::changes(&updates)?;
            let current = self.load(id).await?;
            if B::is_noop(&changes) {
                return Ok(current);
            }
            let mut conn = self.connection().await?;
            B::update(&mut conn, id, &changes)
                .await
                .map_err(Self::map_error)
        })
        .await
    }

    async fn delete_by_id(&self, id: &B::Id) -> Result<(), Error> {
        let span = RepositoryOperation::DeleteById.span(B::ENTITY);
        in_span(span, async {
            let mut conn = self.connection().await?;
            let removed = B::delete(&mut conn, id).await.map_err(Self::map_error)?;
            debug!(%id, removed, "delete by id");
            Ok(())
        })
        .await
    }

    async fn delete_all(&self) -> Result<(), Error> {
        let span = RepositoryOperation::DeleteAll.span(B::ENTITY);
        in_span(span, async {
            let mut conn = self.connection().await?;
            let removed = B::delete_all(&mut conn).await.map_err(Self::map_error)?;
            debug!(removed, "delete all");
            Ok(())
        })
        .await
    }
}
