//! Request-scoped correlation context.
//!
//! The inbound tracing middleware builds one [`RequestContext`] per request
//! and runs the rest of the request inside [`RequestContext::scope`]. Code
//! further down the call chain reads it back with [`RequestContext::current`]
//! instead of threading identifiers through every signature.
//!
//! Tokio task-local values are not inherited by spawned tasks. Wrap spawned
//! futures in [`RequestContext::scope`] to keep correlation intact.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use tracing::Span;
use uuid::Uuid;

task_local! {
    static REQUEST_CONTEXT: RequestContext;
}

const MAX_REQUEST_ID_LEN: usize = 128;

/// Correlation identifier supplied by the client or generated per request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Accept a client-supplied identifier if it is usable as a header value
    /// and log field.
    ///
    /// # Examples
    /// ```
    /// use users_api::domain::RequestId;
    ///
    /// assert!(RequestId::from_header("abc-123").is_some());
    /// assert!(RequestId::from_header("   ").is_none());
    /// ```
    pub fn from_header(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let usable = !trimmed.is_empty()
            && trimmed.len() <= MAX_REQUEST_ID_LEN
            && trimmed.bytes().all(|byte| byte.is_ascii_graphic());
        usable.then(|| Self(trimmed.to_owned()))
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Distributed trace identifier, rendered as 32 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Generate a new random trace identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Extract the trace id from a W3C `traceparent` header.
    ///
    /// The header has the shape `version-traceid-parentid-flags`. All-zero
    /// trace ids are invalid and rejected.
    pub fn from_traceparent(header: &str) -> Option<Self> {
        let mut parts = header.trim().split('-');
        let version = parts.next()?;
        let trace = parts.next()?;
        let parent = parts.next()?;
        let flags = parts.next()?;
        let well_formed = version.len() == 2
            && trace.len() == 32
            && parent.len() == 16
            && flags.len() == 2
            && [version, trace, parent, flags]
                .iter()
                .all(|part| part.bytes().all(|byte| byte.is_ascii_hexdigit()));
        if !well_formed {
            return None;
        }
        Uuid::try_parse(trace)
            .ok()
            .filter(|uuid| !uuid.is_nil())
            .map(Self)
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Per-request correlation data plus the request's root span.
///
/// Logging inside `span` (or any span parented on it) carries the request
/// and trace ids automatically.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    trace_id: TraceId,
    span: Span,
}

impl RequestContext {
    /// Build a context without a bound span.
    pub fn new(request_id: RequestId, trace_id: TraceId) -> Self {
        Self {
            request_id,
            trace_id,
            span: Span::none(),
        }
    }

    /// Bind the request's root span.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Correlation id echoed back in `X-Request-ID`.
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Trace id shared with downstream spans.
    pub fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// The request-bound logger.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// The context of the request being served, if any.
    pub fn current() -> Option<Self> {
        REQUEST_CONTEXT.try_with(Clone::clone).ok()
    }

    /// Run `fut` with this context in scope.
    ///
    /// # Examples
    /// ```
    /// use users_api::domain::{RequestContext, RequestId, TraceId};
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let ctx = RequestContext::new(RequestId::generate(), TraceId::generate());
    /// let expected = ctx.request_id().clone();
    /// let observed = ctx
    ///     .scope(async { RequestContext::current().map(|c| c.request_id().clone()) })
    ///     .await;
    /// assert_eq!(observed, Some(expected));
    /// # });
    /// ```
    pub async fn scope<Fut>(self, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        REQUEST_CONTEXT.scope(self, fut).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[tokio::test]
    async fn current_is_none_out_of_scope() {
        assert!(RequestContext::current().is_none());
    }

    #[tokio::test]
    async fn current_reflects_scope() {
        let request_id = RequestId::from_header("req-42").expect("valid id");
        let trace_id = TraceId::generate();
        let ctx = RequestContext::new(request_id.clone(), trace_id);
        let observed = ctx
            .scope(async {
                RequestContext::current().map(|c| (c.request_id().clone(), c.trace_id()))
            })
            .await;
        assert_eq!(observed, Some((request_id, trace_id)));
    }

    #[rstest]
    #[case("abc", true)]
    #[case("  padded  ", true)]
    #[case("", false)]
    #[case("has space", false)]
    #[case("tab\tinside", false)]
    fn request_id_header_validation(#[case] raw: &str, #[case] accepted: bool) {
        assert_eq!(RequestId::from_header(raw).is_some(), accepted);
    }

    #[rstest]
    fn overlong_request_ids_are_rejected() {
        let raw = "a".repeat(MAX_REQUEST_ID_LEN + 1);
        assert!(RequestId::from_header(&raw).is_none());
    }

    #[rstest]
    fn generated_request_ids_are_uuids() {
        let id = RequestId::generate();
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[rstest]
    fn traceparent_yields_trace_id() {
        let header = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";
        let trace_id = TraceId::from_traceparent(header).expect("valid traceparent");
        assert_eq!(trace_id.to_string(), "4bf92f3577b34da6a3ce929d0e0e4736");
    }

    #[rstest]
    #[case("garbage")]
    #[case("00-00000000000000000000000000000000-00f067aa0ba902b7-01")]
    #[case("00-4bf92f3577b34da6a3ce929d0e0e47-00f067aa0ba902b7-01")]
    #[case("00-4bf92f3577b34da6a3ce929d0e0e473z-00f067aa0ba902b7-01")]
    fn malformed_traceparent_is_ignored(#[case] header: &str) {
        assert!(TraceId::from_traceparent(header).is_none());
    }

    #[rstest]
    fn trace_id_renders_as_hex() {
        let trace_id: TraceId = "4bf92f35-77b3-4da6-a3ce-929d0e0e4736"
            .parse()
            .expect("valid uuid");
        assert_eq!(trace_id.to_string(), "4bf92f3577b34da6a3ce929d0e0e4736");
    }
}
