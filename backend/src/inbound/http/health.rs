//! Health endpoints: liveness and readiness probes for orchestration and
//! load balancers.

use std::collections::BTreeMap;

use actix_web::http::header;
use actix_web::{HttpResponse, get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{HealthReport, ReadinessReport};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::state::HttpState;

/// Liveness body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct LivenessResponse {
    #[schema(example = "healthy")]
    pub status: String,
}

impl From<HealthReport> for LivenessResponse {
    fn from(report: HealthReport) -> Self {
        Self {
            status: report.status.as_str().to_owned(),
        }
    }
}

/// Status of one probed dependency.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct ComponentResponse {
    #[schema(example = "healthy")]
    pub status: String,
}

/// Readiness body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct ReadinessResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub components: BTreeMap<String, ComponentResponse>,
}

impl From<ReadinessReport> for ReadinessResponse {
    fn from(report: ReadinessReport) -> Self {
        let components = report
            .components
            .into_iter()
            .map(|(name, status)| {
                (
                    name,
                    ComponentResponse {
                        status: status.as_str().to_owned(),
                    },
                )
            })
            .collect();
        Self {
            status: report.status.as_str().to_owned(),
            components,
        }
    }
}

/// Liveness probe. Returns 200 while the process can serve requests.
#[utoipa::path(
    get,
    path = "/healthz",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is alive", body = LivenessResponse),
        (status = 404, description = "Wrong method; only GET probes are routed", body = ErrorEnvelope)
    )
)]
#[get("/healthz")]
pub async fn live(state: web::Data<HttpState>) -> HttpResponse {
    let report = state.health.check_health().await;
    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(LivenessResponse::from(report))
}

/// Readiness probe. Returns 200 when every dependency answers and 503 with
/// the error envelope otherwise.
#[utoipa::path(
    get,
    path = "/readyz",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is ready to handle traffic", body = ReadinessResponse),
        (status = 503, description = "A dependency is unavailable", body = ErrorEnvelope)
    )
)]
#[get("/readyz")]
pub async fn ready(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let report = state.health.check_readiness().await?;
    Ok(HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(ReadinessResponse::from(report)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::ports::{MockHealthQuery, MockUserCommand, MockUserQuery};
    use crate::domain::{Error, HealthStatus};

    fn state(health: MockHealthQuery) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(
            Arc::new(MockUserCommand::new()),
            Arc::new(MockUserQuery::new()),
            Arc::new(health),
        ))
    }

    #[actix_web::test]
    async fn liveness_reports_healthy() {
        let mut health = MockHealthQuery::new();
        health
            .expect_check_health()
            .times(1)
            .return_const(HealthReport::healthy());
        let app =
            actix_test::init_service(App::new().app_data(state(health)).service(live)).await;

        let res =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/healthz").to_request())
                .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()
                .get(header::CACHE_CONTROL)
                .and_then(|value| value.to_str().ok()),
            Some("no-store")
        );
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body, json!({"status": "healthy"}));
    }

    #[actix_web::test]
    async fn readiness_lists_components() {
        let mut health = MockHealthQuery::new();
        health.expect_check_readiness().times(1).return_once(|| {
            Ok(ReadinessReport::from_components([(
                "database",
                HealthStatus::Healthy,
            )]))
        });
        let app =
            actix_test::init_service(App::new().app_data(state(health)).service(ready)).await;

        let req = actix_test::TestRequest::get().uri("/readyz").to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;

        assert_eq!(
            body,
            json!({"status": "healthy", "components": {"database": {"status": "healthy"}}})
        );
    }

    #[actix_web::test]
    async fn readiness_failure_is_service_unavailable() {
        let mut health = MockHealthQuery::new();
        health.expect_check_readiness().return_once(|| {
            Err(
                Error::service_unavailable("Readiness check detected unhealthy components")
                    .with_meta("component", "database"),
            )
        });
        let app =
            actix_test::init_service(App::new().app_data(state(health)).service(ready)).await;

        let res =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/readyz").to_request())
                .await;

        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: ErrorEnvelope = actix_test::read_body_json(res).await;
        assert_eq!(body.status, 503);
        assert_eq!(body.error, "Service Unavailable");
    }
}
