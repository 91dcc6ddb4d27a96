//! Driving port for liveness and readiness checks.

use async_trait::async_trait;

use crate::domain::{Error, HealthReport, ReadinessReport};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthQuery: Send + Sync {
    /// Liveness. Never fails while the process is up.
    async fn check_health(&self) -> HealthReport;

    /// Readiness. Fails with `SERVICE_UNAVAILABLE` naming the unhealthy
    /// components when any probe fails.
    async fn check_readiness(&self) -> Result<ReadinessReport, Error>;
}
