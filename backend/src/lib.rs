//! Users service library: domain model and use cases, HTTP and persistence
//! adapters, and the ambient logging and configuration layers.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod observability;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use settings::AppSettings;
