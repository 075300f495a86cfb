use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, OriginalUri, Request},
    Json,
};
use serde::de::DeserializeOwned;

use super::error_handlers::{ApiError, FieldViolation};

/// Prefix axum puts in front of deserialization failures
const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// JSON body extractor whose rejections render as the 422 envelope
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // Nested routers strip their prefix from the request URI
        let path = match req.extensions().get::<OriginalUri>() {
            Some(OriginalUri(uri)) => uri.path().to_string(),
            None => req.uri().path().to_string(),
        };
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidatedJson(value)),
            Err(rejection) => Err(ApiError::Payload {
                path,
                violations: vec![violation_from(&rejection)],
            }),
        }
    }
}

fn violation_from(rejection: &JsonRejection) -> FieldViolation {
    match rejection {
        JsonRejection::JsonDataError(err) => data_violation(&err.body_text()),
        JsonRejection::JsonSyntaxError(err) => {
            FieldViolation::new(["body"], strip_position(&err.body_text()))
        }
        JsonRejection::MissingJsonContentType(_) => FieldViolation::new(
            ["header", "content-type"],
            "expected `application/json` content type",
        ),
        other => FieldViolation::new(["body"], other.body_text()),
    }
}

/// Turn a deserialization failure into a located violation.
///
/// The text is either `path: message` or a bare message for the document
/// root, where a missing field names its key in backticks.
fn data_violation(text: &str) -> FieldViolation {
    let text = text.strip_prefix(DATA_ERROR_PREFIX).unwrap_or(text);

    let mut loc = vec!["body".to_string()];
    let message = match text.split_once(": ") {
        Some((path, message)) if !path.is_empty() && !path.contains(char::is_whitespace) => {
            loc.extend(path_segments(path));
            message
        }
        _ => text,
    };
    let message = strip_position(message);

    if let Some(field) = missing_field(&message) {
        loc.push(field.to_string());
    }

    FieldViolation::new(loc, message)
}

/// Split `members[0].name` into `members`, `0`, `name`
fn path_segments(path: &str) -> Vec<String> {
    path.split('.')
        .flat_map(|segment| segment.split(['[', ']']))
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

fn missing_field(message: &str) -> Option<&str> {
    message
        .strip_prefix("missing field `")
        .and_then(|rest| rest.strip_suffix('`'))
}

/// Drop serde_json's trailing ` at line N column M`
fn strip_position(message: &str) -> String {
    match message.rfind(" at line ") {
        Some(idx) if message[idx..].contains(" column ") => message[..idx].to_string(),
        _ => message.to_string(),
    }
}
