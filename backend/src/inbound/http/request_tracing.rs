//! Request correlation middleware.
//!
//! Every request gets a request id (reused from `X-Request-ID` when the
//! client supplies a usable one, generated otherwise) and a trace id (taken
//! from a W3C `traceparent` header or generated). Both are stamped on an
//! `http.request` span, published through [`RequestContext`] for the rest of
//! the request, and the request id is echoed in the response's
//! `X-Request-ID` header.

use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{Instrument, debug, error, field, info_span};

use crate::domain::{RequestContext, RequestId, TraceId};

/// Correlation header read from requests and written to responses.
pub const REQUEST_ID_HEADER: &str = "x-request-id";
/// W3C trace context header.
pub const TRACEPARENT_HEADER: &str = "traceparent";

/// Middleware factory. Register it outermost so every other layer runs
/// inside the request context.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use users_api::inbound::http::RequestTracing;
///
/// let _app = App::new().wrap(RequestTracing);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestTracing;

impl<S, B> Transform<S, ServiceRequest> for RequestTracing
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestTracingMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTracingMiddleware { service }))
    }
}

/// Service wrapper produced by [`RequestTracing`].
pub struct RequestTracingMiddleware<S> {
    service: S,
}

fn header_str<'a>(req: &'a ServiceRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|value| value.to_str().ok())
}

impl<S, B> Service<ServiceRequest> for RequestTracingMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let request_id = header_str(&req, REQUEST_ID_HEADER)
            .and_then(RequestId::from_header)
            .unwrap_or_else(RequestId::generate);
        let trace_id = header_str(&req, TRACEPARENT_HEADER)
            .and_then(TraceId::from_traceparent)
            .unwrap_or_else(TraceId::generate);

        let span = info_span!(
            "http.request",
            request_id = %request_id,
            trace_id = %trace_id,
            span_id = field::Empty,
            http.request.method = %req.method(),
            url.path = %req.path(),
            http.response.status_code = field::Empty,
            "error.type" = field::Empty,
            otel.status_code = field::Empty,
            otel.status_message = field::Empty
        );
        if let Some(id) = span.id() {
            span.record("span_id", field::display(format_args!("{:016x}", id.into_u64())));
        }

        let context = RequestContext::new(request_id.clone(), trace_id).with_span(span.clone());
        let fut = {
            let _entered = span.enter();
            self.service.call(req)
        };

        let request_span = span.clone();
        Box::pin(context.scope(
            async move {
                let mut res = fut.await?;
                let status = res.status();
                request_span.record("http.response.status_code", status.as_u16());
                if status.is_server_error() {
                    request_span.record("otel.status_code", "ERROR");
                } else {
                    request_span.record("otel.status_code", "OK");
                }
                match HeaderValue::from_str(request_id.as_str()) {
                    Ok(value) => {
                        res.response_mut()
                            .headers_mut()
                            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
                    }
                    Err(err) => error!(error = %err, "failed to encode request id header"),
                }
                debug!(status = status.as_u16(), "request completed");
                Ok(res)
            }
            .instrument(span),
        ))
    }
}
