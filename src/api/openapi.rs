use utoipa::OpenApi;

use crate::api::handlers::{HealthResponse, HealthStatus};
use crate::errors::ErrorBody;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "TeamOn API",
        version = "0.1.0",
        description = "Backend for the TeamOn productivity and HR platform. Every response uses the `{code, message, data}` envelope; code 1000 means success, any other code names a specific failure and error bodies carry an `error_id` matching the server log.",
        contact(
            name = "TeamOn API",
        )
    ),
    paths(
        crate::api::handlers::health,
    ),
    components(
        schemas(
            ErrorBody,
            HealthResponse,
            HealthStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;
