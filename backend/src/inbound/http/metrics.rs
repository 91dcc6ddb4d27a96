//! Prometheus instrumentation for the HTTP surface.
//!
//! `actix-web-prom` serves [`METRICS_PATH`] and records request counts and
//! durations labelled by method, route pattern and status. The layer adds two
//! collectors on the same registry: requests currently in flight (by method)
//! and declared request body sizes (by route pattern, method and status).

use std::sync::Arc;
use std::task::{Context, Poll};

use actix_service::{
    Service, Transform,
    boxed::{self, BoxService},
};
use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::CONTENT_LENGTH;
use actix_web::middleware::Compat;
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use futures_util::future::LocalBoxFuture;
use prometheus::{HistogramOpts, HistogramVec, IntGauge, IntGaugeVec, Opts, Registry};

/// Path serving the text exposition format.
pub const METRICS_PATH: &str = "/metrics";

/// Route label for requests that matched no registered pattern.
const UNMATCHED: &str = "unmatched";

const BODY_SIZE_BUCKETS: [f64; 8] = [
    64.0, 256.0, 1024.0, 4096.0, 16_384.0, 65_536.0, 262_144.0, 1_048_576.0,
];

/// Failures while assembling the registry.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// A collector could not be created or registered.
    #[error("failed to register collector: {0}")]
    Register(#[from] prometheus::Error),
    /// `actix-web-prom` rejected its configuration.
    #[error("failed to build prometheus middleware: {0}")]
    Build(String),
}

struct Collectors {
    active: IntGaugeVec,
    body_size: HistogramVec,
}

/// Registry plus middleware for one service namespace.
#[derive(Clone)]
pub struct HttpMetrics {
    prometheus: PrometheusMetrics,
    registry: Registry,
    collectors: Arc<Collectors>,
}

impl HttpMetrics {
    /// Build collectors under `namespace`; dashes become underscores.
    ///
    /// # Examples
    /// ```
    /// use users_api::inbound::http::metrics::HttpMetrics;
    ///
    /// let metrics = HttpMetrics::new("users-api").expect("collectors register");
    /// let _registry = metrics.registry();
    /// ```
    pub fn new(namespace: &str) -> Result<Self, MetricsError> {
        let prefix = namespace.replace('-', "_");
        let registry = Registry::new();

        let active = IntGaugeVec::new(
            Opts::new(
                "http_server_active_requests",
                "HTTP requests currently being served",
            )
            .namespace(prefix.clone()),
            &["method"],
        )?;
        let body_size = HistogramVec::new(
            HistogramOpts::new(
                "http_server_request_body_size_bytes",
                "Declared size of HTTP request bodies",
            )
            .namespace(prefix.clone())
            .buckets(BODY_SIZE_BUCKETS.to_vec()),
            &["endpoint", "method", "status"],
        )?;
        registry.register(Box::new(active.clone()))?;
        registry.register(Box::new(body_size.clone()))?;

        let prometheus = PrometheusMetricsBuilder::new(&prefix)
            .registry(registry.clone())
            .endpoint(METRICS_PATH)
            .build()
            .map_err(|err| MetricsError::Build(err.to_string()))?;

        Ok(Self {
            prometheus,
            registry,
            collectors: Arc::new(Collectors { active, body_size }),
        })
    }

    /// Registry holding every collector served at [`METRICS_PATH`].
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

/// App-level middleware: metrics when configured, a passthrough otherwise.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use users_api::inbound::http::metrics::{HttpMetrics, MetricsLayer};
///
/// let layer = MetricsLayer::from(HttpMetrics::new("users-api").ok());
/// let _app = App::new().wrap(layer);
/// ```
#[derive(Clone)]
pub enum MetricsLayer {
    Enabled(HttpMetrics),
    Disabled,
}

impl From<Option<HttpMetrics>> for MetricsLayer {
    fn from(metrics: Option<HttpMetrics>) -> Self {
        metrics.map_or(Self::Disabled, Self::Enabled)
    }
}

impl<S, B> Transform<S, ServiceRequest> for MetricsLayer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = BoxService<ServiceRequest, ServiceResponse<BoxBody>, actix_web::Error>;
    type Future = LocalBoxFuture<'static, Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        match self.clone() {
            Self::Enabled(metrics) => {
                let tracked = RequestMetrics {
                    service,
                    collectors: metrics.collectors,
                };
                let fut = Compat::new(metrics.prometheus).new_transform(tracked);
                Box::pin(async move { Ok(boxed::service(fut.await?)) })
            }
            Self::Disabled => Box::pin(async move {
                Ok(boxed::service(Passthrough { service }))
            }),
        }
    }
}

/// Decrements the in-flight gauge however the request ends.
struct InFlight(IntGauge);

impl InFlight {
    fn start(gauge: &IntGaugeVec, method: &str) -> Self {
        let gauge = gauge.with_label_values(&[method]);
        gauge.inc();
        Self(gauge)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.dec();
    }
}

fn declared_body_size(req: &ServiceRequest) -> Option<u64> {
    req.headers()
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Records the collectors `actix-web-prom` does not provide.
pub struct RequestMetrics<S> {
    service: S,
    collectors: Arc<Collectors>,
}

impl<S, B> Service<ServiceRequest> for RequestMetrics<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let method = req.method().as_str().to_owned();
        let declared = declared_body_size(&req);
        let in_flight = InFlight::start(&self.collectors.active, &method);
        let collectors = Arc::clone(&self.collectors);
        let fut = self.service.call(req);

        Box::pin(async move {
            let _in_flight = in_flight;
            let res = fut.await?;
            if let Some(size) = declared {
                let endpoint = res
                    .request()
                    .match_pattern()
                    .unwrap_or_else(|| UNMATCHED.to_owned());
                collectors
                    .body_size
                    .with_label_values(&[endpoint.as_str(), method.as_str(), res.status().as_str()])
                    .observe(size as f64);
            }
            Ok(res)
        })
    }
}

/// Boxes the body when metrics are off so both variants share one type.
struct Passthrough<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for Passthrough<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_boxed_body) })
    }
}
