//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`Repository`, `UserRepository`, `HealthProbe`) are
//! implemented by outbound adapters. Driving ports (`UserCommand`,
//! `UserQuery`, `HealthQuery`) are implemented by the domain services and
//! consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod health_probe;
mod health_query;
mod repository;
mod user_command;
mod user_query;
mod user_repository;

#[cfg(test)]
pub use health_probe::MockHealthProbe;
pub use health_probe::HealthProbe;
#[cfg(test)]
pub use health_query::MockHealthQuery;
pub use health_query::HealthQuery;
pub use repository::{Entity, FieldUpdateError, FieldUpdates, Repository};
#[cfg(test)]
pub use user_command::MockUserCommand;
pub use user_command::{CreateUserRequest, UserCommand};
#[cfg(test)]
pub use user_query::MockUserQuery;
pub use user_query::UserQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::UserRepository;
