//! Prometheus exposition after real traffic through the application.
#![cfg(feature = "metrics")]

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use serde_json::json;

use users_api::inbound::http::build_app;
use users_api::inbound::http::metrics::{HttpMetrics, METRICS_PATH, MetricsLayer};

mod support;

#[actix_web::test]
async fn metrics_endpoint_reports_served_requests() {
    let world = support::world();
    let metrics = HttpMetrics::new("users-api").expect("collectors register");
    let app = test::init_service(
        build_app(world.state).wrap(MetricsLayer::from(Some(metrics))),
    )
    .await;

    let created = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/users")
            .set_json(json!({"name": "Ana", "email": "ana@example.com"}))
            .to_request(),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let missing = test::call_service(&app, TestRequest::get().uri("/api/users/42").to_request()).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let scraped = test::call_service(&app, TestRequest::get().uri(METRICS_PATH).to_request()).await;
    assert_eq!(scraped.status(), StatusCode::OK);
    let body = test::read_body(scraped).await;
    let exposition = String::from_utf8(body.to_vec()).expect("utf8 exposition");

    assert!(exposition.contains("users_api_http_requests_total"), "{exposition}");
    assert!(exposition.contains("users_api_http_requests_duration_seconds"), "{exposition}");
    assert!(
        exposition.contains(
            r#"users_api_http_server_request_body_size_bytes_count{endpoint="/api/users",method="POST",status="201"} 1"#
        ),
        "{exposition}"
    );
    assert!(
        exposition.contains(r#"users_api_http_server_active_requests{method="POST"} 0"#),
        "{exposition}"
    );
    assert!(
        exposition.contains(r#"users_api_http_server_active_requests{method="GET"} 0"#),
        "{exposition}"
    );
}

#[actix_web::test]
async fn disabled_layer_leaves_metrics_path_unmatched() {
    let world = support::world();
    let app = test::init_service(build_app(world.state).wrap(MetricsLayer::Disabled)).await;

    let res = test::call_service(&app, TestRequest::get().uri(METRICS_PATH).to_request()).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
