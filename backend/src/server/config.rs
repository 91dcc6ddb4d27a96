//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

#[cfg(feature = "metrics")]
use tracing::warn;
#[cfg(feature = "metrics")]
use users_api::inbound::http::metrics::HttpMetrics;
use users_api::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    #[cfg(feature = "metrics")]
    pub(crate) metrics: Option<HttpMetrics>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Attach a database connection pool. Without one the server runs on
    /// the in-memory store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: Option<DbPool>) -> Self {
        self.db_pool = pool;
        self
    }

    #[cfg(feature = "metrics")]
    /// Serve Prometheus metrics under `namespace`. A registry that fails to
    /// build is logged and the server runs without metrics.
    #[must_use]
    pub fn with_metrics(mut self, namespace: &str) -> Self {
        self.metrics = HttpMetrics::new(namespace)
            .inspect_err(|err| warn!(error = %err, "prometheus metrics disabled"))
            .ok();
        self
    }
}
