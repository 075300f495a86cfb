//! Boundary error handling.
//!
//! Handlers return [`ApiError`]; translated failures render through the
//! standard envelope, everything else degrades to a reduced body that carries
//! a fixed code and no `error_id`.

use std::any::Any;

use axum::{
    body::Body,
    extract::{OriginalUri, Request},
    http::{header, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::domain::errors::DomainError;
use crate::errors::{ApplicationError, ErrorBody, Payload, ResponseCode};
use crate::metrics::FALLBACK_ERRORS_TOTAL;

/// One failed input location reported by request extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Path into the request, e.g. `["body", "company", "name"]`
    pub loc: Vec<String>,
    pub msg: String,
}

impl FieldViolation {
    pub fn new<I, S>(loc: I, msg: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            loc: loc.into_iter().map(Into::into).collect(),
            msg: msg.into(),
        }
    }

    pub fn field(&self) -> String {
        self.loc.join(".")
    }

    fn to_json(&self) -> Value {
        json!({"field": self.field(), "message": self.msg})
    }
}

/// Everything a handler can fail with
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Application(#[from] ApplicationError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("request payload for {path} failed validation ({} violations)", .violations.len())]
    Payload {
        /// Request path the payload was sent to
        path: String,
        violations: Vec<FieldViolation>,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Unhandled(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Application(error) => error.into_response(),
            ApiError::Domain(error) => error.into_response(),
            ApiError::Payload { path, violations } => payload_response(&path, &violations),
            ApiError::Repository(error) => repository_response(&error),
            ApiError::Unhandled(error) => unwrap_unhandled(error),
        }
    }
}

fn unwrap_unhandled(error: anyhow::Error) -> Response {
    let error = match error.downcast::<ApplicationError>() {
        Ok(application) => return application.into_response(),
        Err(error) => error,
    };
    let error = match error.downcast::<DomainError>() {
        Ok(domain) => return domain.into_response(),
        Err(error) => error,
    };
    match error.downcast::<RepositoryError>() {
        Ok(repository) => repository_response(&repository),
        Err(error) => unhandled_response(&format!("{error:#}")),
    }
}

/// Detail kept out of a fallback body; only exposed in debug mode
#[derive(Debug, Clone)]
pub struct WithheldDetail {
    pub code: ResponseCode,
    pub detail: String,
}

fn payload_response(path: &str, violations: &[FieldViolation]) -> Response {
    FALLBACK_ERRORS_TOTAL.with_label_values(&["payload"]).inc();

    let errors: Vec<Value> = violations.iter().map(FieldViolation::to_json).collect();
    tracing::warn!(
        path = %path,
        errors = %serde_json::Value::Array(errors.clone()),
        "Request payload validation failed"
    );

    let mut data = Payload::new();
    data.insert("errors".into(), Value::Array(errors));
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorBody::reduced(ResponseCode::ValidationError, data)),
    )
        .into_response()
}

fn repository_response(error: &RepositoryError) -> Response {
    if let Some(not_found) = error.missing_row() {
        return DomainError::from(not_found).into_response();
    }

    FALLBACK_ERRORS_TOTAL.with_label_values(&["database"]).inc();
    tracing::error!(error = %error, "Database error");
    withheld_response(ResponseCode::DatabaseError, error.to_string())
}

fn unhandled_response(detail: &str) -> Response {
    FALLBACK_ERRORS_TOTAL.with_label_values(&["unhandled"]).inc();
    tracing::error!(error = %detail, "Unhandled error");
    withheld_response(ResponseCode::InternalServerError, detail.to_string())
}

fn withheld_response(code: ResponseCode, detail: String) -> Response {
    let mut response = (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::reduced(code, detail_payload(Value::Null))),
    )
        .into_response();
    response
        .extensions_mut()
        .insert(WithheldDetail { code, detail });
    response
}

fn detail_payload(detail: Value) -> Payload {
    let mut data = Payload::new();
    data.insert("error".into(), detail);
    data
}

/// Renders panics caught by `CatchPanicLayer` as the internal error body
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    FALLBACK_ERRORS_TOTAL.with_label_values(&["panic"]).inc();
    tracing::error!(error = %detail, "Request handler panicked");
    withheld_response(ResponseCode::InternalServerError, detail)
}

/// Debug-mode middleware that puts withheld detail back into fallback bodies
pub async fn expose_error_detail(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let Some(withheld) = response.extensions().get::<WithheldDetail>().cloned() else {
        return response;
    };

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    let body = ErrorBody::reduced(withheld.code, detail_payload(Value::String(withheld.detail)));
    let rendered = Json(body).into_response();
    Response::from_parts(parts, rendered.into_body())
}

/// Fallback for requests that match no route
pub async fn not_found_fallback(OriginalUri(uri): OriginalUri) -> Response {
    not_found_response(&uri)
}

fn not_found_response(uri: &Uri) -> Response {
    tracing::debug!(path = %uri.path(), "No route matched");
    let mut data = Payload::new();
    data.insert("path".into(), Value::String(uri.path().to_string()));
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::reduced(ResponseCode::NotFound, data)),
    )
        .into_response()
}
