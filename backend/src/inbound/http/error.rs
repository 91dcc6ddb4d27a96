//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while turning every
//! failure, domain or framework, into the same JSON envelope:
//! `{"status": 404, "error": "Not Found", "message": "..."}`.

use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::http::header::{CACHE_CONTROL, HeaderValue};
use actix_web::middleware::ErrorHandlerResponse;
use actix_web::{HttpRequest, HttpResponse, ResponseError, error::JsonPayloadError, web};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::domain::{Error, ErrorCode};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Wire shape of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorEnvelope {
    /// HTTP status code.
    #[schema(example = 404)]
    pub status: u16,
    /// Canonical reason phrase for `status`.
    #[schema(example = "Not Found")]
    pub error: String,
    /// Human-readable detail. Internal failures are redacted.
    #[schema(example = "User not found")]
    pub message: String,
}

impl From<&Error> for ErrorEnvelope {
    fn from(err: &Error) -> Self {
        let mapping = err.code().mapping();
        let message = if matches!(err.code(), ErrorCode::Internal) {
            ErrorCode::Internal.default_message().to_owned()
        } else {
            err.message().to_owned()
        };
        Self {
            status: mapping.status,
            error: mapping.reason.to_owned(),
            message,
        }
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if self.is_reportable() {
            error!(
                code = %self.code(),
                metadata = %serde_json::Value::Object(self.metadata().clone()),
                "{}",
                self.message()
            );
        }
        HttpResponse::build(self.status_code())
            .insert_header((CACHE_CONTROL, HeaderValue::from_static("no-store")))
            .json(ErrorEnvelope::from(self))
    }
}

/// Domain error for a framework-level failure status.
///
/// Statuses in the table map to their code; `405` is reported as
/// `NOT_FOUND` so unmatched methods look like unmatched routes; other
/// `4xx` become `BAD_REQUEST`; everything else is `INTERNAL`.
pub fn error_for_status(status: StatusCode) -> Error {
    let code = match status {
        StatusCode::METHOD_NOT_ALLOWED => ErrorCode::NotFound,
        other if other.is_client_error() => {
            ErrorCode::from_http_status(other.as_u16()).unwrap_or(ErrorCode::BadRequest)
        }
        other => ErrorCode::from_http_status(other.as_u16()).unwrap_or(ErrorCode::Internal),
    };
    Error::new(code, "").with_meta("status", status.as_u16())
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        if let Some(domain) = err.as_error::<Self>() {
            return domain.clone();
        }
        let status = err.as_response_error().status_code();
        error_for_status(status).with_meta("cause", err.to_string())
    }
}

/// `ErrorHandlers` default handler: rewrite any error response not already
/// produced from a domain [`Error`] into the envelope.
pub fn normalise_error_response<B>(
    res: ServiceResponse<B>,
) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let from_domain = res
        .response()
        .error()
        .is_some_and(|err| err.as_error::<Error>().is_some());
    if from_domain {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }

    let mut domain = error_for_status(res.status());
    if let Some(cause) = res.response().error() {
        domain = domain.with_meta("cause", cause.to_string());
    }
    let (request, _) = res.into_parts();
    let response = domain.error_response();
    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(request, response).map_into_right_body(),
    ))
}

/// JSON extractor configuration: malformed bodies become `BAD_REQUEST`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    warn!(error = %err, "rejected request body");
    Error::bad_request("Invalid request body").into()
}

/// Default service for unmatched routes.
pub async fn unmatched_route() -> ApiResult<HttpResponse> {
    Err(Error::not_found("Route not found"))
}

#[cfg(test)]
mod tests;
