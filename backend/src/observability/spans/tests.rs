//! Span annotation and correlation coverage.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use rstest::rstest;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use super::*;
use crate::domain::{RequestId, TraceId};

#[derive(Debug, Clone, Default)]
struct CapturedSpan {
    name: String,
    parent: Option<String>,
    fields: HashMap<String, String>,
}

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<HashMap<u64, CapturedSpan>>>);

impl Capture {
    fn find(&self, name: &str) -> CapturedSpan {
        let spans = self.0.lock().expect("capture lock");
        spans
            .values()
            .find(|span| span.name == name || span.fields.get("otel.name").is_some_and(|n| n == name))
            .cloned()
            .unwrap_or_else(|| panic!("span {name} not captured"))
    }
}

struct FieldVisitor<'a>(&'a mut HashMap<String, String>);

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_owned(), value.to_owned());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_owned(), format!("{value:?}"));
    }
}

impl<S> Layer<S> for Capture
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut captured = CapturedSpan {
            name: attrs.metadata().name().to_owned(),
            parent: ctx
                .span(id)
                .and_then(|span| span.parent())
                .map(|parent| parent.name().to_owned()),
            fields: HashMap::new(),
        };
        attrs.record(&mut FieldVisitor(&mut captured.fields));
        self.0.lock().expect("capture lock").insert(id.into_u64(), captured);
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, _ctx: Context<'_, S>) {
        if let Some(span) = self.0.lock().expect("capture lock").get_mut(&id.into_u64()) {
            values.record(&mut FieldVisitor(&mut span.fields));
        }
    }
}

fn install() -> (Capture, tracing::subscriber::DefaultGuard) {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let guard = tracing::subscriber::set_default(subscriber);
    (capture, guard)
}

#[rstest]
fn domain_errors_record_table_status() {
    let (capture, _guard) = install();
    let span = crate::correlated_span!("use_case", otel.name = "GetUser");
    record_error(&span, &Error::not_found("missing"));
    drop(span);

    let fields = capture.find("GetUser").fields;
    assert_eq!(fields["http.response.status_code"], "404");
    assert_eq!(fields["error.type"], "NOT_FOUND");
    assert_eq!(fields["otel.status_code"], "ERROR");
    assert_eq!(fields["otel.status_message"], "missing");
}

#[rstest]
fn foreign_errors_record_internal() {
    let (capture, _guard) = install();
    let span = crate::correlated_span!("use_case", otel.name = "Foreign");
    let err = std::io::Error::other("disk gone");
    record_error(&span, &err);

    let fields = capture.find("Foreign").fields;
    assert_eq!(fields["http.response.status_code"], "500");
    assert_eq!(fields["error.type"], "INTERNAL");
}

#[rstest]
fn disabled_spans_are_ignored() {
    record_error(&Span::none(), &Error::internal("boom"));
}

#[tokio::test]
async fn in_span_marks_success() {
    let (capture, _guard) = install();
    let span = crate::correlated_span!("use_case", otel.name = "Works");
    let outcome: Result<u8, Error> = in_span(span, async { Ok(1) }).await;
    assert_eq!(outcome, Ok(1));
    assert_eq!(capture.find("Works").fields["otel.status_code"], "OK");
}

#[tokio::test]
async fn spans_carry_request_correlation() {
    let (capture, _guard) = install();
    let request_id = RequestId::from_header("req-7").expect("valid id");
    let trace_id = TraceId::generate();
    let root = tracing::info_span!("http.request");
    let ctx = RequestContext::new(request_id, trace_id).with_span(root);

    ctx.scope(async {
        let span = RepositoryOperation::GetById.span("User");
        drop(span);
    })
    .await;

    let captured = capture.find("User.GetByID");
    assert_eq!(captured.fields["request_id"], "req-7");
    assert_eq!(captured.fields["trace_id"], trace_id.to_string());
    assert_eq!(captured.fields["db.operation"], "SELECT");
    assert_eq!(captured.fields["db.model"], "User");
    assert_eq!(captured.parent.as_deref(), Some("http.request"));
}

#[rstest]
#[case(RepositoryOperation::Add, "Add", "INSERT")]
#[case(RepositoryOperation::UpdateById, "UpdateByID", "UPDATE")]
#[case(RepositoryOperation::DeleteById, "DeleteByID", "DELETE")]
#[case(RepositoryOperation::DeleteAll, "DeleteAll", "DELETE_ALL")]
#[case(RepositoryOperation::Lookup("GetByEmail"), "GetByEmail", "SELECT")]
fn repository_operations_name_spans(
    #[case] op: RepositoryOperation,
    #[case] method: &str,
    #[case] db_operation: &str,
) {
    assert_eq!(op.method(), method);
    assert_eq!(op.db_operation(), db_operation);
}
