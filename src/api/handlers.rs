use axum::extract::State;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use utoipa::ToSchema;

use crate::config::Config;
use crate::errors::ApiResponse;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub config: Config,
    pub started_at: Instant,
}

impl AppStateInner {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            started_at: Instant::now(),
        }
    }
}

/// Service liveness details
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    #[schema(example = "healthy")]
    pub status: String,
    pub service: String,
    pub version: String,
    #[schema(example = "development")]
    pub environment: String,
    pub instance_id: String,
    pub uptime_seconds: u64,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> ApiResponse<HealthStatus> {
    ApiResponse::success(HealthStatus {
        status: "healthy".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.app.environment.to_string(),
        instance_id: state.config.server.instance_id.clone(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}

/// Success envelope carrying [`HealthStatus`]
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = 1000)]
    pub code: u16,
    #[schema(example = "Success")]
    pub message: String,
    pub data: Option<HealthStatus>,
}
