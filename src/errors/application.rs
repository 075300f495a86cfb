//! Application-layer errors, already bound to an HTTP status and payload.

use axum::http::StatusCode;
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use super::codes::ResponseCode;
use super::normalize::Payload;
use crate::metrics::APPLICATION_ERRORS_TOTAL;

/// Which token failed an expiry check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    InvalidCredentials,
    TokenExpired(TokenKind),
    InvalidToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationErrorKind {
    ResourceNotFound,
    ValidationFailed,
    BusinessRuleViolation,
    Authentication(AuthFailure),
    Authorization,
    Database,
    Internal,
    /// Raised directly with an arbitrary registry code
    Generic,
}

/// A failure ready to cross the HTTP boundary.
///
/// Every instance gets a fresh `error_id` and is logged exactly once, when it
/// is constructed. Rendering never logs it again.
#[derive(Debug, Error)]
#[error("[{error_id}] {message}")]
pub struct ApplicationError {
    kind: ApplicationErrorKind,
    code: ResponseCode,
    message: String,
    status: StatusCode,
    additional_info: Payload,
    error_id: Uuid,
}

impl ApplicationError {
    /// Raise an error with an arbitrary code and status
    pub fn new(
        code: ResponseCode,
        message: impl Into<String>,
        status: StatusCode,
        additional_info: Payload,
    ) -> Self {
        Self::build(ApplicationErrorKind::Generic, code, message, status, additional_info)
    }

    pub fn resource_not_found(
        message: impl Into<String>,
        resource_type: Option<&str>,
        resource_id: Option<String>,
        additional_info: Payload,
    ) -> Self {
        let mut info = Payload::new();
        info.insert(
            "entity_type".into(),
            Value::String(resource_type.unwrap_or("Resource").to_string()),
        );
        info.insert("resource_id".into(), resource_id.map_or(Value::Null, Value::String));
        info.extend(additional_info);

        Self::build(
            ApplicationErrorKind::ResourceNotFound,
            ResponseCode::NotFound,
            message,
            StatusCode::NOT_FOUND,
            info,
        )
    }

    pub fn validation_failed(
        message: impl Into<String>,
        field: impl Into<String>,
        value: Value,
        additional_info: Payload,
    ) -> Self {
        let mut info = Payload::new();
        info.insert("field".into(), Value::String(field.into()));
        info.insert("value".into(), value);
        info.insert("additional_info".into(), Value::Object(additional_info));

        Self::build(
            ApplicationErrorKind::ValidationFailed,
            ResponseCode::ValidationError,
            message,
            StatusCode::BAD_REQUEST,
            info,
        )
    }

    pub fn business_rule_violation(
        message: impl Into<String>,
        rule: impl Into<String>,
        context: Payload,
    ) -> Self {
        let mut info = Payload::new();
        info.insert("rule".into(), Value::String(rule.into()));
        info.insert("context".into(), Value::Object(context));

        Self::build(
            ApplicationErrorKind::BusinessRuleViolation,
            ResponseCode::BusinessRuleViolation,
            message,
            StatusCode::BAD_REQUEST,
            info,
        )
    }

    pub fn invalid_credentials(additional_info: Payload) -> Self {
        Self::authentication(
            AuthFailure::InvalidCredentials,
            ResponseCode::AuthInvalidCredentials,
            additional_info,
        )
    }

    pub fn token_expired(token: TokenKind, additional_info: Payload) -> Self {
        let code = match token {
            TokenKind::Access => ResponseCode::AuthTokenExpired,
            TokenKind::Refresh => ResponseCode::AuthRefreshTokenExpired,
        };

        let mut info = Payload::new();
        info.insert("token_type".into(), Value::String(token.as_str().to_string()));
        info.extend(additional_info);

        Self::authentication(AuthFailure::TokenExpired(token), code, info)
    }

    pub fn invalid_token(reason: impl Into<String>, additional_info: Payload) -> Self {
        let mut info = Payload::new();
        info.insert("reason".into(), Value::String(reason.into()));
        info.extend(additional_info);

        Self::authentication(AuthFailure::InvalidToken, ResponseCode::AuthInvalidToken, info)
    }

    fn authentication(failure: AuthFailure, code: ResponseCode, additional_info: Payload) -> Self {
        let message = code.format_message(&additional_info);
        Self::build(
            ApplicationErrorKind::Authentication(failure),
            code,
            message,
            StatusCode::UNAUTHORIZED,
            additional_info,
        )
    }

    pub fn authorization(
        message: impl Into<String>,
        required_permissions: Option<Vec<String>>,
        additional_info: Payload,
    ) -> Self {
        let mut info = Payload::new();
        info.insert(
            "required_permissions".into(),
            required_permissions.map_or(Value::Null, |perms| {
                Value::Array(perms.into_iter().map(Value::String).collect())
            }),
        );
        info.extend(additional_info);

        Self::build(
            ApplicationErrorKind::Authorization,
            ResponseCode::AuthAccessDenied,
            message,
            StatusCode::FORBIDDEN,
            info,
        )
    }

    /// Persistence failure; the detail is logged but never sent to clients
    pub fn database(message: impl Into<String>) -> Self {
        Self::build(
            ApplicationErrorKind::Database,
            ResponseCode::DatabaseError,
            message,
            StatusCode::INTERNAL_SERVER_ERROR,
            Payload::new(),
        )
    }

    pub fn internal(message: impl Into<String>, additional_info: Payload) -> Self {
        Self::build(
            ApplicationErrorKind::Internal,
            ResponseCode::InternalServerError,
            message,
            StatusCode::INTERNAL_SERVER_ERROR,
            additional_info,
        )
    }

    fn build(
        kind: ApplicationErrorKind,
        code: ResponseCode,
        message: impl Into<String>,
        status: StatusCode,
        additional_info: Payload,
    ) -> Self {
        let error = Self {
            kind,
            code,
            message: message.into(),
            status,
            additional_info,
            error_id: Uuid::new_v4(),
        };
        error.record();
        error
    }

    fn record(&self) {
        tracing::error!(
            error_id = %self.error_id,
            error_code = self.code.code(),
            error_message = %self.message,
            additional_info = %serde_json::Value::Object(self.additional_info.clone()),
            "[{}] {}",
            self.error_id,
            self.message
        );

        APPLICATION_ERRORS_TOTAL
            .with_label_values(&[self.code.code().to_string().as_str(), self.status.as_str()])
            .inc();
    }

    pub fn kind(&self) -> ApplicationErrorKind {
        self.kind
    }

    pub fn code(&self) -> ResponseCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn additional_info(&self) -> &Payload {
        &self.additional_info
    }

    pub fn error_id(&self) -> Uuid {
        self.error_id
    }
}
