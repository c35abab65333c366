//! KaNcy relay - a single chat endpoint in front of the OpenAI chat completions API
//!
//! The relay takes `{ "message": "..." }` from a browser, asks the completion endpoint for a
//! reply with a fixed system prompt, and hands back `{ "reply": "..." }`. It keeps no state
//! between requests.

use axum::Router;
use axum::routing::any;
use axum_prometheus::{
    GenericMetricLayer, Handle, PrometheusMetricLayerBuilder,
    metrics_exporter_prometheus::PrometheusHandle,
};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{info, instrument};

pub mod client;
pub mod cors;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod settings;
mod upstream;

use client::{HttpClient, HyperClient, PoolSettings};
use handlers::chat_handler;
use settings::RelaySettings;

/// Path the chat widget posts to.
pub const CHAT_PATH: &str = "/chat";

/// Netlify's function path, kept so front-ends built against the serverless deployment keep working.
pub const NETLIFY_CHAT_PATH: &str = "/.netlify/functions/chat";

/// The main application state containing the HTTP client and relay settings
#[derive(Clone, Debug)]
pub struct AppState<T: HttpClient> {
    pub http_client: T,
    pub settings: Arc<RelaySettings>,
}

impl AppState<HyperClient> {
    /// Create a new AppState with the default Hyper client
    pub fn new(settings: RelaySettings, pool: PoolSettings) -> Self {
        let http_client = client::create_hyper_client(pool);
        Self {
            http_client,
            settings: Arc::new(settings),
        }
    }
}

impl<T: HttpClient> AppState<T> {
    /// Create a new AppState with a custom HTTP client (useful for testing)
    pub fn with_client(settings: RelaySettings, http_client: T) -> Self {
        Self {
            http_client,
            settings: Arc::new(settings),
        }
    }
}

/// Build the main router for the relay.
///
/// The handler is mounted with `any` so that unsupported methods reach it and get a 405 with the
/// CORS headers, instead of axum's bare rejection.
#[instrument(skip(state))]
pub fn build_router<T: HttpClient + Clone + Send + Sync + 'static>(state: AppState<T>) -> Router {
    info!("Building router");
    Router::new()
        .route(CHAT_PATH, any(chat_handler))
        .route(NETLIFY_CHAT_PATH, any(chat_handler))
        .with_state(state)
}

/// Builds a router for the metrics endpoint.
#[instrument(skip(handle))]
pub fn build_metrics_router(handle: PrometheusHandle) -> Router {
    info!("Building metrics router");
    Router::new().route(
        "/metrics",
        axum::routing::get(move || async move { handle.render() }),
    )
}

type MetricsLayerAndHandle = (
    GenericMetricLayer<'static, PrometheusHandle, Handle>,
    PrometheusHandle,
);

/// Builds a layer and handle for prometheus metrics collection.
///
/// The prefix is prepended to every metric name, e.g. `kancy_relay_http_requests_total`.
pub fn build_metrics_layer_and_handle(
    prefix: impl Into<Cow<'static, str>>,
) -> MetricsLayerAndHandle {
    info!("Building metrics layer");
    PrometheusMetricLayerBuilder::new()
        .with_prefix(prefix)
        .enable_response_body_size(true)
        .with_endpoint_label_type(axum_prometheus::EndpointLabel::Exact)
        .with_default_metrics()
        .build_pair()
}
