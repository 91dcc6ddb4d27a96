//! Domain primitives, ports and use cases.
//!
//! Purpose: keep business rules independent of transport and storage.
//! Inbound adapters call the driving ports implemented by the services here;
//! outbound adapters implement the driven ports.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failures and the status table.
//! - RequestContext: request-scoped correlation data.
//! - User, NewUser, UserId, UserProfile: the user entity and its views.
//! - HealthReport, ReadinessReport: liveness and readiness answers.
//! - UserService, HealthService: use-case implementations.

pub mod error;
pub mod health;
pub mod health_service;
pub mod ports;
pub mod request_context;
pub mod user;
pub mod user_service;

pub use self::error::{Error, ErrorCode, STATUS_TABLE, StatusMapping, status_for_code};
pub use self::health::{HealthReport, HealthStatus, ReadinessReport};
pub use self::health_service::HealthService;
pub use self::request_context::{RequestContext, RequestId, TraceId};
pub use self::user::{NewUser, User, UserChanges, UserId, UserProfile, UserValidationError};
pub use self::user_service::UserService;

/// Convenient result alias for domain operations.
///
/// # Examples
/// ```
/// use users_api::domain::{DomainResult, Error};
///
/// fn lookup() -> DomainResult<u32> {
///     Err(Error::not_found("nope"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
