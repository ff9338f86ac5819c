use std::{error::Error, sync::Arc};

use axum::{routing::get, Router};
use http::HeaderValue;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, Level};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt, Registry};

use crate::{
    handlers::{hello::say_hello, qualifying::get_qualifying},
    utils::{config::Config, state::AppState},
};

/// Builds the router for a given state. Split from `make_app` so tests can
/// drive the router without touching env or the global subscriber.
pub fn app(state: Arc<AppState>) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost"),
        HeaderValue::from_static("http://localhost:3000"),
    ];
    // mirror_request rather than Any: wildcards are rejected when
    // credentials are allowed.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Router::new()
        .route("/", get(get_qualifying))
        .route("/hello/{name}", get(say_hello))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn make_app() -> Result<Router, Box<dyn Error>> {
    let log_level = std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase();

    let level = match log_level.as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let filter = filter::Targets::new()
        .with_target("tower_http::trace::on_response", Level::TRACE)
        .with_target("tower_http::trace::on_request", Level::TRACE)
        .with_target("tower_http::trace::make_span", Level::DEBUG)
        .with_target(env!("CARGO_CRATE_NAME"), level)
        .with_default(Level::INFO);

    let tracing_layer = tracing_subscriber::fmt::layer();

    Registry::default().with(tracing_layer).with(filter).init();

    info!("Initializing application...");
    let config = Config::init();

    info!("Configuration loaded successfully");
    let state = AppState::init(config)?;
    info!("Provider cache directory ready at {}", state.config.cache_dir);

    Ok(app(Arc::new(state)))
}
