//! Process-local adapters.
//!
//! Used as the store when no database URL is configured, and as realistic
//! doubles in tests.

mod in_memory_health_probe;
mod in_memory_repository;
mod in_memory_user_repository;

pub use in_memory_health_probe::InMemoryHealthProbe;
pub use in_memory_repository::{InMemoryRepository, MemoryRecord};
pub use in_memory_user_repository::InMemoryUserRepository;
