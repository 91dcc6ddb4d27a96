//! Database reachability probe backing the readiness check.

use async_trait::async_trait;
use diesel_async::RunQueryDsl;
use tracing::{Instrument, warn};

use super::pool::DbPool;
use crate::correlated_span;
use crate::domain::Error;
use crate::domain::ports::HealthProbe;
use crate::observability::record_error;

/// Pings PostgreSQL with `SELECT 1` through the shared pool.
#[derive(Clone)]
pub struct DieselHealthProbe {
    pool: DbPool,
}

impl DieselHealthProbe {
    /// Probe sharing the application's pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn round_trip(&self) -> Result<(), Error> {
        let mut conn = self.pool.get().await?;
        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map_err(|err| Error::internal("").with_meta("cause", err.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl HealthProbe for DieselHealthProbe {
    fn component(&self) -> &'static str {
        "database"
    }

    async fn ping(&self) -> Result<bool, Error> {
        let span = correlated_span!("probe", otel.name = "Database.Ping", db.operation = "SELECT");
        let outcome = self.round_trip().instrument(span.clone()).await;
        match outcome {
            Ok(()) => Ok(true),
            Err(err) => {
                record_error(&span, &err);
                let _entered = span.enter();
                warn!(error = %err, "database ping failed");
                Ok(false)
            }
        }
    }
}
