//! Tests for HTTP error mapping.

use super::*;
use actix_web::body::to_bytes;
use actix_web::middleware::ErrorHandlers;
use actix_web::{App, HttpResponse, test as actix_test};
use rstest::rstest;
use std::io;
use std::sync::{Arc, Mutex};

async fn envelope_of(response: HttpResponse) -> ErrorEnvelope {
    let bytes = to_bytes(response.into_body()).await.expect("read body");
    serde_json::from_slice(&bytes).expect("envelope json")
}

#[rstest]
#[case(Error::bad_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::unprocessable("taken"), StatusCode::UNPROCESSABLE_ENTITY)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
fn status_code_matches_error_code(#[case] err: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&err), status);
}

#[actix_web::test]
async fn error_response_uses_envelope() {
    let err = Error::not_found("User not found").with_meta("id", 7);
    let response = err.error_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let envelope = envelope_of(response).await;
    assert_eq!(
        envelope,
        ErrorEnvelope {
            status: 404,
            error: "Not Found".into(),
            message: "User not found".into(),
        }
    );
}

#[actix_web::test]
async fn internal_messages_are_redacted() {
    let err = Error::internal("pq: password authentication failed").with_meta("dsn", "secret");
    let envelope = envelope_of(err.error_response()).await;
    assert_eq!(envelope.status, 500);
    assert_eq!(envelope.error, "Internal Server Error");
    assert_eq!(envelope.message, "Internal server error");
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn reportable_errors_log_code_and_metadata() {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let err = Error::internal("connection refused").with_meta("table", "users");
    let response = err.error_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let logged = String::from_utf8(buffer.0.lock().expect("log buffer lock").clone())
        .expect("utf8 log output");
    assert!(logged.contains("connection refused"), "{logged}");
    assert!(logged.contains("code=INTERNAL"), "{logged}");
    assert!(logged.contains(r#""table":"users""#), "{logged}");
}

#[actix_web::test]
async fn service_unavailable_keeps_its_message() {
    let err = Error::service_unavailable("Readiness check detected unhealthy components");
    let envelope = envelope_of(err.error_response()).await;
    assert_eq!(envelope.status, 503);
    assert_eq!(envelope.message, "Readiness check detected unhealthy components");
}

#[rstest]
#[case(StatusCode::NOT_FOUND, ErrorCode::NotFound)]
#[case(StatusCode::METHOD_NOT_ALLOWED, ErrorCode::NotFound)]
#[case(StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized)]
#[case(StatusCode::PAYLOAD_TOO_LARGE, ErrorCode::BadRequest)]
#[case(StatusCode::UNSUPPORTED_MEDIA_TYPE, ErrorCode::BadRequest)]
#[case(StatusCode::SERVICE_UNAVAILABLE, ErrorCode::ServiceUnavailable)]
#[case(StatusCode::BAD_GATEWAY, ErrorCode::Internal)]
fn framework_statuses_map_to_codes(#[case] status: StatusCode, #[case] code: ErrorCode) {
    assert_eq!(error_for_status(status).code(), code);
}

#[rstest]
fn actix_errors_wrapping_domain_errors_are_unwrapped() {
    let original = Error::unprocessable("Email already in use");
    let wrapped: actix_web::Error = original.clone().into();
    assert_eq!(Error::from(wrapped), original);
}

#[rstest]
fn foreign_actix_errors_map_by_status() {
    let wrapped = actix_web::error::ErrorPayloadTooLarge("too big");
    let err = Error::from(wrapped);
    assert_eq!(err.code(), ErrorCode::BadRequest);
    assert_eq!(err.metadata()["cause"], "too big");
}

async fn plain_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().body("nope")
}

async fn domain_failure() -> ApiResult<HttpResponse> {
    Err(Error::unprocessable("Email already in use"))
}

#[actix_web::test]
async fn error_handler_normalises_plain_responses() {
    let app = actix_test::init_service(
        App::new()
            .wrap(ErrorHandlers::new().default_handler(normalise_error_response))
            .route("/plain", web::get().to(plain_not_allowed))
            .route("/domain", web::get().to(domain_failure)),
    )
    .await;

    let plain = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/plain").to_request()).await;
    assert_eq!(plain.status(), StatusCode::NOT_FOUND);
    let body: ErrorEnvelope = actix_test::read_body_json(plain).await;
    assert_eq!(body.error, "Not Found");
    assert_eq!(body.message, "Not found");

    let domain = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/domain").to_request()).await;
    assert_eq!(domain.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorEnvelope = actix_test::read_body_json(domain).await;
    assert_eq!(body.message, "Email already in use");
}
