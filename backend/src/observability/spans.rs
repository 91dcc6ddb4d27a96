//! Correlated spans and outcome annotation.

use std::future::Future;

use tracing::{Instrument, Span};

use crate::domain::{Error, ErrorCode, RequestContext};

/// Open an `INFO` span stamped with the current request and trace ids.
///
/// The span is parented on the current span or, failing that, on the
/// request's root span. Outcome fields (`http.response.status_code`,
/// `error.type`, `otel.status_code`, `otel.status_message`) are declared
/// empty so [`record_error`](crate::observability::record_error) can fill
/// them later. Extra fields follow the name as in `info_span!`.
///
/// # Examples
/// ```
/// let span = users_api::correlated_span!("use_case", otel.name = "GetUser");
/// let _entered = span.enter();
/// ```
#[macro_export]
macro_rules! correlated_span {
    ($name:literal, $($fields:tt)+) => {{
        let context = $crate::domain::RequestContext::current();
        let request_id = context.as_ref().map(|ctx| ctx.request_id().to_string());
        let trace_id = context.as_ref().map(|ctx| ctx.trace_id().to_string());
        ::tracing::info_span!(
            parent: $crate::observability::parent_for(context.as_ref()),
            $name,
            request_id = request_id.as_deref(),
            trace_id = trace_id.as_deref(),
            http.response.status_code = ::tracing::field::Empty,
            "error.type" = ::tracing::field::Empty,
            otel.status_code = ::tracing::field::Empty,
            otel.status_message = ::tracing::field::Empty,
            $($fields)+
        )
    }};
}

/// Parent for a new correlated span: the current span if one is entered,
/// otherwise the request's root span.
pub fn parent_for(context: Option<&RequestContext>) -> Option<tracing::Id> {
    Span::current()
        .id()
        .or_else(|| context.and_then(|ctx| ctx.span().id()))
}

/// Annotate `span` with a failure.
///
/// Domain errors contribute their table status and code. Anything else is
/// recorded as `500`/`INTERNAL`. Disabled spans are left alone.
pub fn record_error(span: &Span, error: &(dyn std::error::Error + 'static)) {
    if span.is_disabled() {
        return;
    }
    match error.downcast_ref::<Error>() {
        Some(domain) => {
            span.record("http.response.status_code", domain.http_status());
            span.record("error.type", domain.code().as_str());
            span.record("otel.status_message", domain.message());
        }
        None => {
            span.record(
                "http.response.status_code",
                ErrorCode::Internal.http_status(),
            );
            span.record("error.type", ErrorCode::Internal.as_str());
            span.record("otel.status_message", tracing::field::display(error));
        }
    }
    span.record("otel.status_code", "ERROR");
}

/// Annotate `span` with a successful outcome.
pub fn record_ok(span: &Span) {
    span.record("otel.status_code", "OK");
}

/// Run `fut` inside `span` and annotate the span with the outcome.
pub async fn in_span<T, E, F>(span: Span, fut: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: std::error::Error + 'static,
{
    let outcome = fut.instrument(span.clone()).await;
    match &outcome {
        Ok(_) => record_ok(&span),
        Err(error) => record_error(&span, error),
    }
    outcome
}

/// Repository operations, used to name spans and tag them with
/// `db.operation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryOperation {
    Add,
    GetById,
    UpdateById,
    DeleteById,
    DeleteAll,
    /// Entity-specific read, e.g. `GetByEmail`.
    Lookup(&'static str),
}

impl RepositoryOperation {
    /// Method name used in the span name `<Entity>.<Method>`.
    pub const fn method(self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::GetById => "GetByID",
            Self::UpdateById => "UpdateByID",
            Self::DeleteById => "DeleteByID",
            Self::DeleteAll => "DeleteAll",
            Self::Lookup(name) => name,
        }
    }

    pub const fn db_operation(self) -> &'static str {
        match self {
            Self::Add => "INSERT",
            Self::GetById | Self::Lookup(_) => "SELECT",
            Self::UpdateById => "UPDATE",
            Self::DeleteById => "DELETE",
            Self::DeleteAll => "DELETE_ALL",
        }
    }

    /// Open the span for this operation on `entity`.
    pub fn span(self, entity: &'static str) -> Span {
        let name = format!("{entity}.{}", self.method());
        crate::correlated_span!(
            "repository",
            otel.name = name.as_str(),
            db.operation = self.db_operation(),
            db.model = entity
        )
    }
}

#[cfg(test)]
mod tests;
