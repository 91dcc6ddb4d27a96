//! Tracing and logging plumbing shared by every layer.
//!
//! - [`correlated_span!`](crate::correlated_span) opens a span stamped with
//!   the current request and trace ids.
//! - [`record_error`] and [`record_ok`] annotate a span with an outcome.
//! - [`in_span`] runs a fallible future inside a span and annotates it.
//! - [`logging`] installs the process-wide subscriber.

pub mod logging;
mod spans;

pub use spans::{RepositoryOperation, in_span, parent_for, record_error, record_ok};
