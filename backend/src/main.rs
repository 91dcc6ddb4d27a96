//! Service entry-point: loads `.env` and settings, initialises logging and
//! persistence, then serves the HTTP API until a shutdown signal arrives.

mod server;

use std::io;

use tracing::{debug, error, info, warn};

use server::{ServerConfig, create_server};
use users_api::AppSettings;
use users_api::settings::{EnvFile, load_env_file};
use users_api::observability::logging;
use users_api::outbound::persistence::{DbPool, migrations};

/// Open the pool and optionally migrate. Returns `None` when no database is
/// configured.
async fn connect_database(settings: &AppSettings) -> io::Result<Option<DbPool>> {
    let Some(pool_config) = settings.pool_config() else {
        return Ok(None);
    };
    if settings.run_migrations() {
        let applied = migrations::run_pending(pool_config.database_url())
            .await
            .map_err(io::Error::other)?;
        info!(applied, "database migrations applied");
    }
    let pool = DbPool::connect(&pool_config)
        .await
        .map_err(io::Error::other)?;
    info!(max_connections = pool_config.max_size(), "database pool ready");
    Ok(Some(pool))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    let env_file = load_env_file();
    let settings = AppSettings::from_env().map_err(io::Error::other)?;

    match settings.logging_config() {
        Ok(config) => {
            if let Err(e) = logging::init(&config) {
                warn!(error = %e, "tracing init failed");
            }
        }
        Err(e) => warn!(error = %e, "invalid logging configuration"),
    }
    match env_file {
        Ok(EnvFile::Loaded(path)) => info!(path = %path.display(), "loaded environment file"),
        Ok(EnvFile::Missing) => debug!("no .env file found"),
        Err(e) => warn!(error = %e, "environment file ignored"),
    }

    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    let pool = connect_database(&settings).await.inspect_err(|e| {
        error!(error = %e, "database initialisation failed");
    })?;

    let config = ServerConfig::new(bind_addr).with_db_pool(pool);
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(settings.service_name());

    info!(service = settings.service_name(), "starting");
    let result = create_server(config)?.await;
    info!(service = settings.service_name(), "shut down");
    result
}
