//! Health and readiness reports.

use std::collections::BTreeMap;

use serde::Serialize;

/// Binary health verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Reachable, or no dependency check involved.
    Healthy,
    /// At least one checked dependency failed.
    Unhealthy,
}

impl HealthStatus {
    /// Wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
        }
    }

    /// True for [`HealthStatus::Healthy`].
    pub const fn is_healthy(self) -> bool {
        matches!(self, Self::Healthy)
    }
}

impl From<bool> for HealthStatus {
    fn from(reachable: bool) -> Self {
        if reachable {
            Self::Healthy
        } else {
            Self::Unhealthy
        }
    }
}

/// Liveness answer. Always healthy while the process can respond.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
}

impl HealthReport {
    /// The only liveness answer.
    pub const fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
        }
    }
}

/// Readiness answer listing every probed component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadinessReport {
    pub status: HealthStatus,
    pub components: BTreeMap<String, HealthStatus>,
}

impl ReadinessReport {
    /// Aggregate per-component results. Any unhealthy component makes the
    /// whole report unhealthy.
    ///
    /// # Examples
    /// ```
    /// use users_api::domain::{HealthStatus, ReadinessReport};
    ///
    /// let report = ReadinessReport::from_components([
    ///     ("database", HealthStatus::Healthy),
    ///     ("cache", HealthStatus::Unhealthy),
    /// ]);
    /// assert_eq!(report.status, HealthStatus::Unhealthy);
    /// assert_eq!(report.unhealthy_components(), vec!["cache"]);
    /// ```
    pub fn from_components<I, N>(components: I) -> Self
    where
        I: IntoIterator<Item = (N, HealthStatus)>,
        N: Into<String>,
    {
        let components: BTreeMap<String, HealthStatus> = components
            .into_iter()
            .map(|(name, status)| (name.into(), status))
            .collect();
        let status = HealthStatus::from(components.values().all(|status| status.is_healthy()));
        Self { status, components }
    }

    /// Names of the components reporting unhealthy, in name order.
    pub fn unhealthy_components(&self) -> Vec<&str> {
        self.components
            .iter()
            .filter(|(_, status)| !status.is_healthy())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
