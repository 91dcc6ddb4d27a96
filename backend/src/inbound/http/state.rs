//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{HealthQuery, UserCommand, UserQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub user_commands: Arc<dyn UserCommand>,
    pub user_queries: Arc<dyn UserQuery>,
    pub health: Arc<dyn HealthQuery>,
}

impl HttpState {
    pub fn new(
        user_commands: Arc<dyn UserCommand>,
        user_queries: Arc<dyn UserQuery>,
        health: Arc<dyn HealthQuery>,
    ) -> Self {
        Self {
            user_commands,
            user_queries,
            health,
        }
    }
}
