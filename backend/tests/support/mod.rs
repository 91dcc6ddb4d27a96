//! Shared wiring for HTTP integration tests: the real use cases over the
//! in-memory adapters.

use std::sync::Arc;

use actix_web::web;

use users_api::domain::ports::HealthProbe;
use users_api::domain::{HealthService, UserService};
use users_api::inbound::http::HttpState;
use users_api::outbound::memory::{InMemoryHealthProbe, InMemoryUserRepository};

/// Application state plus handles to the adapters behind it.
pub struct TestWorld {
    pub state: web::Data<HttpState>,
    #[allow(dead_code, reason = "Only the users suite inspects the store")]
    pub users: Arc<InMemoryUserRepository>,
    #[allow(dead_code, reason = "Only the health suite toggles reachability")]
    pub database: Arc<InMemoryHealthProbe>,
}

pub fn world() -> TestWorld {
    let users = Arc::new(InMemoryUserRepository::default());
    let database = Arc::new(InMemoryHealthProbe::new("database", true));
    let service = Arc::new(UserService::new(users.clone()));
    let probe: Arc<dyn HealthProbe> = database.clone();
    let health = Arc::new(HealthService::new(vec![probe]));
    TestWorld {
        state: web::Data::new(HttpState::new(service.clone(), service, health)),
        users,
        database,
    }
}
