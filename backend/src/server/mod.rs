//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_web::HttpServer;
use actix_web::dev::Server;
use tracing::info;

use users_api::inbound::http::build_app;
#[cfg(feature = "metrics")]
use users_api::inbound::http::metrics::MetricsLayer;
#[cfg(debug_assertions)]
use users_api::ApiDoc;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Construct the Actix HTTP server.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let http_state = build_http_state(config.db_pool.as_ref());
    let ServerConfig {
        bind_addr,
        db_pool: _,
        #[cfg(feature = "metrics")]
        metrics,
    } = config;

    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::from(metrics);

    let server = HttpServer::new(move || {
        let app = build_app(http_state.clone());

        #[cfg(debug_assertions)]
        let app = app.service(
            SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "http server listening");
    Ok(server)
}
