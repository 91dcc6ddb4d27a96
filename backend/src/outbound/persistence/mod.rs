//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! - **Generic repository**: [`DieselRepository`] implements the domain
//!   repository contract once; [`TableBinding`] supplies per-entity SQL.
//! - **Internal models**: row structs (`models.rs`) and the schema
//!   (`schema.rs`) never leave this module.
//! - **Async-safe pooling**: `bb8` pools through `diesel-async`.
//! - **Domain errors only**: Diesel failures are translated at the edge.
//!
//! # Example
//!
//! ```ignore
//! use users_api::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::connect(&PoolConfig::new("postgres://localhost/users")).await?;
//! let repo = DieselUserRepository::new(pool);
//! ```

mod diesel_error_mapping;
mod diesel_health_probe;
mod diesel_repository;
mod diesel_user_repository;
pub mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_health_probe::DieselHealthProbe;
pub use diesel_repository::{DieselRepository, TableBinding};
pub use diesel_user_repository::{DieselUserRepository, UsersTable};
pub use pool::{DbPool, PoolConfig, PoolError};
