use axum::{
    http::HeaderValue,
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::error_handlers::{expose_error_detail, handle_panic, not_found_fallback};
use super::handlers::{health, AppState};
use super::middleware::logging_middleware;
use super::openapi::ApiDoc;
use crate::config::{Config, CorsConfig};
use crate::metrics;

pub fn create_router(state: AppState) -> Router {
    build_router(state, Router::new())
}

/// Assemble the service with `api` mounted under the configured API prefix.
///
/// Health, metrics and the docs stay unversioned at the root.
pub fn build_router(state: AppState, api: Router<AppState>) -> Router {
    let config = state.config.clone();

    let router = Router::new()
        // Health check
        .route("/health", get(health))
        // Metrics endpoint (Prometheus)
        .route("/metrics", get(metrics::metrics_handler));

    let router = match config.app.api_prefix.as_str() {
        "" => router.merge(api),
        prefix => router.nest(prefix, api),
    };

    let router = router
        .with_state(state)
        // OpenAPI documentation
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    apply_middleware(router, &config)
}

/// Wrap a router in the shared middleware stack and the 404 fallback.
///
/// Routes must be registered before this is called; metrics are recorded per
/// matched route.
pub fn apply_middleware(router: Router, config: &Config) -> Router {
    // Order matters: panics are caught innermost so every outer layer sees the
    // rendered 500, and the debug detail layer must sit outside the catcher.
    let router = router
        .route_layer(middleware::from_fn(metrics::middleware::track_metrics))
        .fallback(not_found_fallback)
        .layer(CatchPanicLayer::custom(handle_panic));

    let router = if config.app.debug {
        router.layer(middleware::from_fn(expose_error_detail))
    } else {
        router
    };

    router
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(logging_middleware))
        .layer(cors_layer(&config.cors))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let origin = match cors {
        CorsConfig::Any => AllowOrigin::any(),
        CorsConfig::Origins(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            AllowOrigin::list(origins)
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
