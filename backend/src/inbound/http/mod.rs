//! HTTP inbound adapter exposing REST endpoints.

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::ErrorHandlers;
use actix_web::{App, web};

pub mod error;
pub mod health;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod request_tracing;
pub mod state;
pub mod users;

pub use error::{ApiResult, ErrorEnvelope};
pub use request_tracing::{REQUEST_ID_HEADER, RequestTracing};
pub use state::HttpState;

/// Methods browsers may use cross-origin.
const CORS_METHODS: [&str; 6] = ["GET", "POST", "HEAD", "PUT", "DELETE", "PATCH"];

/// Open CORS policy: any origin, answered with a wildcard, no credentials.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allowed_methods(CORS_METHODS)
        .allow_any_header()
}

/// Assemble the application: probes at the root, user endpoints under
/// `/api`, envelope normalisation for every error response, CORS headers on
/// every response, and request correlation around everything.
///
/// # Examples
/// ```no_run
/// use actix_web::{HttpServer, web};
/// use users_api::inbound::http::{HttpState, build_app};
///
/// # fn run(state: web::Data<HttpState>) -> std::io::Result<()> {
/// let _server = HttpServer::new(move || build_app(state.clone())).bind(("0.0.0.0", 3000))?;
/// # Ok(())
/// # }
/// ```
pub fn build_app(
    state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .app_data(error::json_config())
        .wrap(ErrorHandlers::new().default_handler(error::normalise_error_response))
        .wrap(cors())
        .wrap(RequestTracing)
        .service(health::live)
        .service(health::ready)
        .service(
            web::scope("/api")
                .service(users::create_user)
                .service(users::get_user),
        )
        .default_service(web::to(error::unmatched_route))
}
