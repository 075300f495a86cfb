pub mod middleware;
pub mod registry;

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use prometheus::{Encoder, TextEncoder};

use crate::errors::{ApplicationError, Payload};

pub use registry::{
    APPLICATION_ERRORS_TOTAL, FALLBACK_ERRORS_TOTAL, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION_SECONDS,
};

/// Prometheus exposition of every registered metric.
///
/// Served raw rather than inside the response envelope so scrapers can read it.
pub async fn metrics_handler() -> Result<Response, ApplicationError> {
    let encoder = TextEncoder::new();
    let body = encoder
        .encode_to_string(&prometheus::gather())
        .map_err(|e| {
            ApplicationError::internal(format!("Failed to encode metrics: {e}"), Payload::new())
        })?;

    Ok(([(header::CONTENT_TYPE, encoder.format_type())], body).into_response())
}
