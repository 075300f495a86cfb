pub mod error_handlers;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;

pub use error_handlers::{ApiError, FieldViolation};
pub use extract::ValidatedJson;
