//! Liveness and readiness use cases.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::{debug, error, info, warn};

use crate::correlated_span;
use crate::domain::ports::{HealthProbe, HealthQuery};
use crate::domain::{Error, HealthReport, HealthStatus, ReadinessReport};
use crate::observability::in_span;

/// Health service aggregating the registered dependency probes.
#[derive(Clone, Default)]
pub struct HealthService {
    probes: Vec<Arc<dyn HealthProbe>>,
}

impl HealthService {
    pub fn new(probes: Vec<Arc<dyn HealthProbe>>) -> Self {
        Self { probes }
    }

    async fn probe(probe: &dyn HealthProbe) -> (&'static str, HealthStatus) {
        let component = probe.component();
        let status = match probe.ping().await {
            Ok(reachable) => HealthStatus::from(reachable),
            Err(err) => {
                warn!(component, error = %err, "health probe failed");
                HealthStatus::Unhealthy
            }
        };
        (component, status)
    }

    async fn readiness(&self) -> Result<ReadinessReport, Error> {
        let results = join_all(self.probes.iter().map(|probe| Self::probe(probe.as_ref()))).await;
        let unhealthy: Vec<&str> = results
            .iter()
            .filter(|(_, status)| !status.is_healthy())
            .map(|(component, _)| *component)
            .collect();
        if let Some(first) = unhealthy.first() {
            error!(components = ?unhealthy, "readiness check detected unhealthy components");
            return Err(
                Error::service_unavailable("Readiness check detected unhealthy components")
                    .with_meta("component", *first)
                    .with_meta("components", unhealthy.clone()),
            );
        }
        let report = ReadinessReport::from_components(results);
        info!(components = report.components.len(), "readiness check passed");
        Ok(report)
    }
}

#[async_trait]
impl HealthQuery for HealthService {
    async fn check_health(&self) -> HealthReport {
        let span = correlated_span!("use_case", otel.name = "CheckHealth", health.status = "healthy");
        let _entered = span.enter();
        debug!("liveness check");
        HealthReport::healthy()
    }

    async fn check_readiness(&self) -> Result<ReadinessReport, Error> {
        let span = correlated_span!(
            "use_case",
            otel.name = "CheckReadiness",
            probes = self.probes.len()
        );
        in_span(span, self.readiness()).await
    }
}
