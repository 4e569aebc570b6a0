//! CORS layer configuration.

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

use chateo_core::config::ServerConfig;

/// Builds a CORS tower layer from the allowed origins.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    if config.allowed_origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer.allow_origin(origins)
    }
}
