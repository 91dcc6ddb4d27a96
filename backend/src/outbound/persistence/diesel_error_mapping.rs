//! Translation of Diesel failures into domain errors.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::Error;

/// Map a Diesel error raised while operating on `entity`.
///
/// `NotFound` becomes `NOT_FOUND`, unique-constraint violations go through
/// `unique_violation` (normally `UNPROCESSABLE`), everything else is
/// `INTERNAL` with the cause kept in metadata.
pub(crate) fn map_diesel_error<U>(error: DieselError, entity: &'static str, unique_violation: U) -> Error
where
    U: FnOnce(Option<&str>) -> Error,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), entity, "diesel operation failed");
        }
        other => debug!(error = %other, entity, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => Error::not_found(format!("{entity} not found")),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            let constraint = info.constraint_name();
            unique_violation(constraint).with_meta("constraint", constraint.unwrap_or_default())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            Error::internal("")
                .with_meta("entity", entity)
                .with_meta("cause", "database connection closed")
                .with_meta("detail", info.message())
        }
        other => Error::internal("")
            .with_meta("entity", entity)
            .with_meta("cause", other.to_string()),
    }
}
