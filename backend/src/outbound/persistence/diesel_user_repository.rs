//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use super::diesel_repository::{DieselRepository, TableBinding};
use super::models::{NewUserRow, UserChangeset, UserRow};
use super::schema::users;
use crate::domain::ports::{FieldUpdates, UserRepository};
use crate::domain::{Error, NewUser, User, UserChanges, UserId};
use crate::observability::{RepositoryOperation, in_span};

/// Binding of the `users` table to the [`User`] entity.
pub struct UsersTable;

#[async_trait]
impl TableBinding for UsersTable {
    type Entity = User;
    type Id = UserId;
    type Changes = UserChanges;

    const ENTITY: &'static str = "User";

    fn changes(updates: &FieldUpdates) -> Result<UserChanges, Error> {
        UserChanges::try_from(updates).map_err(Error::from)
    }

    fn is_noop(changes: &UserChanges) -> bool {
        changes.is_empty()
    }

    fn unique_violation(constraint: Option<&str>) -> Error {
        Error::unprocessable("Email already in use")
            .with_meta("entity", Self::ENTITY)
            .with_meta("constraint", constraint.unwrap_or_default())
    }

    async fn insert(conn: &mut AsyncPgConnection, draft: &NewUser) -> QueryResult<User> {
        let row = NewUserRow {
            name: draft.name.as_str(),
            email: draft.email.as_str(),
        };
        diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(conn)
            .await
            .map(User::from)
    }

    async fn find(conn: &mut AsyncPgConnection, id: &UserId) -> QueryResult<Option<User>> {
        users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(conn)
            .await
            .optional()
            .map(|row| row.map(User::from))
    }

    async fn update(
        conn: &mut AsyncPgConnection,
        id: &UserId,
        changes: &UserChanges,
    ) -> QueryResult<User> {
        diesel::update(users::table.find(id.get()))
            .set(UserChangeset::from_changes(changes, Utc::now()))
            .returning(UserRow::as_returning())
            .get_result(conn)
            .await
            .map(User::from)
    }

    async fn delete(conn: &mut AsyncPgConnection, id: &UserId) -> QueryResult<usize> {
        diesel::delete(users::table.find(id.get()))
            .execute(conn)
            .await
    }

    async fn delete_all(conn: &mut AsyncPgConnection) -> QueryResult<usize> {
        diesel::delete(users::table).execute(conn).await
    }
}

/// Diesel-backed user store.
pub type DieselUserRepository = DieselRepository<UsersTable>;

#[async_trait]
impl UserRepository for DieselRepository<UsersTable> {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let span = RepositoryOperation::Lookup("GetByEmail").span(UsersTable::ENTITY);
        in_span(span, async {
            let mut conn = self.connection().await?;
            users::table
                .filter(users::email.eq(email))
                .select(UserRow::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map(|row| row.map(User::from))
                .map_err(Self::map_error)
        })
        .await
    }
}
