//! Driven port for dependency reachability probes.

use async_trait::async_trait;

use crate::domain::Error;

/// A dependency the service needs in order to serve traffic.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Component name reported in readiness output, e.g. `database`.
    fn component(&self) -> &'static str;

    /// Check reachability. `Ok(false)` and `Err(_)` both count as
    /// unhealthy.
    async fn ping(&self) -> Result<bool, Error>;
}
