use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::application::ApplicationError;
use super::codes::ResponseCode;
use super::normalize::Payload;
use crate::domain::errors::DomainError;

/// Message carried by every success envelope
pub const SUCCESS_MESSAGE: &str = "Success";

/// Error envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric response code; never 1000
    #[schema(example = 1001)]
    pub code: u16,
    /// Human-readable message rendered from the code's template
    pub message: String,
    /// Structured context for the failure
    #[schema(value_type = Option<Object>)]
    pub data: Option<Payload>,
    /// Correlation id matching the server log entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_id: Option<String>,
}

impl ErrorBody {
    /// Body for failures that never became an [`ApplicationError`]
    pub fn reduced(code: ResponseCode, data: Payload) -> Self {
        Self {
            code: code.code(),
            message: code.template().to_string(),
            data: Some(data),
            error_id: None,
        }
    }
}

/// Success envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    #[schema(example = 1000)]
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: impl Into<Option<T>>) -> Self {
        Self::with_message(SUCCESS_MESSAGE, data)
    }

    pub fn with_message(message: impl Into<String>, data: impl Into<Option<T>>) -> Self {
        Self {
            code: ResponseCode::Success.code(),
            message: message.into(),
            data: data.into(),
        }
    }

    /// Envelope for a failure code with no data, e.g. a handled outcome that
    /// never became an [`ApplicationError`]
    pub fn error(code: ResponseCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Render an application error as its HTTP status and envelope
pub fn render(error: &ApplicationError) -> (StatusCode, ErrorBody) {
    let info = error.additional_info();
    let body = ErrorBody {
        code: error.code().code(),
        message: error.code().format_message(info),
        data: (!info.is_empty()).then(|| info.clone()),
        error_id: Some(error.error_id().to_string()),
    };
    (error.status(), body)
}

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let (status, body) = render(&self);
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        ApplicationError::from(self).into_response()
    }
}
