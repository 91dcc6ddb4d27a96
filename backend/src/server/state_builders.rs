//! Composition of use cases and adapters into the HTTP state.

use std::sync::Arc;

use actix_web::web;
use tracing::warn;

use users_api::domain::ports::{HealthProbe, UserRepository};
use users_api::domain::{HealthService, UserService};
use users_api::inbound::http::HttpState;
use users_api::outbound::memory::{InMemoryHealthProbe, InMemoryUserRepository};
use users_api::outbound::persistence::{DbPool, DieselHealthProbe, DieselUserRepository};

/// Store-backed adapters for the configured persistence mode.
fn build_adapters(pool: Option<&DbPool>) -> (Arc<dyn UserRepository>, Arc<dyn HealthProbe>) {
    match pool {
        Some(pool) => (
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselHealthProbe::new(pool.clone())),
        ),
        None => {
            warn!("no database configured; users are kept in memory and lost on restart");
            (
                Arc::new(InMemoryUserRepository::default()),
                Arc::new(InMemoryHealthProbe::new("database", true)),
            )
        }
    }
}

/// Wire use cases to adapters.
pub(crate) fn build_http_state(pool: Option<&DbPool>) -> web::Data<HttpState> {
    let (users, probe) = build_adapters(pool);
    let user_service = Arc::new(UserService::new(users));
    let health = Arc::new(HealthService::new(vec![probe]));
    web::Data::new(HttpState::new(user_service.clone(), user_service, health))
}
