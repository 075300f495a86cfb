//! Domain to application error translation.
//!
//! Translation is total: every input yields an [`ApplicationError`], nothing
//! is re-raised. Dispatch order is fixed: not-found, validation, business
//! rule, other described domain failures, then persistence and plain errors.
//! A missing row is a not-found failure even when it comes from persistence.

use serde_json::Value;

use super::application::ApplicationError;
use super::normalize::{value_to_text, Payload};
use crate::db::RepositoryError;
use crate::domain::errors::{
    BusinessRuleError, DomainError, DomainFault, EntityNotFound, ToDict, ValidationError,
};

pub fn translate(error: DomainError) -> ApplicationError {
    match error {
        DomainError::EntityNotFound(e) => translate_entity_not_found(e),
        DomainError::Validation(e) => translate_validation(e),
        DomainError::BusinessRule(e) => translate_business_rule(e),
        DomainError::Other(e) => translate_described(&e),
    }
}

/// Translate an arbitrary error, unwrapping known failure types first
pub fn translate_any(error: anyhow::Error) -> ApplicationError {
    let error = match error.downcast::<DomainError>() {
        Ok(domain) => return translate(domain),
        Err(error) => error,
    };
    let error = match error.downcast::<EntityNotFound>() {
        Ok(e) => return translate_entity_not_found(e),
        Err(error) => error,
    };
    let error = match error.downcast::<ValidationError>() {
        Ok(e) => return translate_validation(e),
        Err(error) => error,
    };
    let error = match error.downcast::<BusinessRuleError>() {
        Ok(e) => return translate_business_rule(e),
        Err(error) => error,
    };
    let error = match error.downcast::<DomainFault>() {
        Ok(e) => return translate_described(&e),
        Err(error) => error,
    };

    if let Some(repository) = error.downcast_ref::<RepositoryError>() {
        return match repository.missing_row() {
            Some(not_found) => translate_entity_not_found(not_found),
            None => ApplicationError::database(format!("{error:#}")),
        };
    }

    ApplicationError::internal(format!("{error:#}"), Payload::new())
}

fn translate_entity_not_found(error: EntityNotFound) -> ApplicationError {
    let message = error.to_string();
    ApplicationError::resource_not_found(
        message,
        Some(error.entity_type.as_str()),
        error.entity_id,
        error.context,
    )
}

fn translate_validation(error: ValidationError) -> ApplicationError {
    let message = error.to_string();
    ApplicationError::validation_failed(message, error.field, error.invalid_value, error.context)
}

fn translate_business_rule(error: BusinessRuleError) -> ApplicationError {
    let message = error.to_string();
    ApplicationError::business_rule_violation(message, error.rule, error.context)
}

fn translate_described(error: &dyn DescribedError) -> ApplicationError {
    let mut dict = error.to_dict();
    let message = match dict.remove("message") {
        Some(Value::String(message)) => message,
        Some(other) => value_to_text(&other),
        None => error.to_string(),
    };
    ApplicationError::internal(message, dict)
}

/// Errors that can describe themselves as a dictionary
trait DescribedError: ToDict + std::fmt::Display {}

impl<T: ToDict + std::fmt::Display> DescribedError for T {}

impl From<DomainError> for ApplicationError {
    fn from(error: DomainError) -> Self {
        translate(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::codes::ResponseCode;
    use crate::errors::application::ApplicationErrorKind;
    use anyhow::Context;
    use axum::http::StatusCode;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn test_entity_not_found_translation() {
        let domain = EntityNotFound::new("User")
            .with_id("u1")
            .with_context([("k", "v")]);

        let app = translate(domain.into());

        assert_eq!(app.kind(), ApplicationErrorKind::ResourceNotFound);
        assert_eq!(app.code(), ResponseCode::NotFound);
        assert_eq!(app.status(), StatusCode::NOT_FOUND);
        assert!(app.message().contains("User"));
        assert!(app.message().contains("u1"));
        assert_eq!(app.additional_info()["entity_type"], "User");
        assert_eq!(app.additional_info()["resource_id"], "u1");
        assert_eq!(app.additional_info()["k"], "v");
    }

    #[test]
    fn test_validation_translation() {
        let domain = ValidationError::new("email", "bad format")
            .with_value("x@")
            .with_context([("p", "regex")]);

        let app = translate(domain.into());

        assert_eq!(app.code(), ResponseCode::ValidationError);
        assert_eq!(app.status(), StatusCode::BAD_REQUEST);
        assert!(app.message().contains("email"));
        assert_eq!(
            Value::Object(app.additional_info().clone()),
            json!({"field": "email", "value": "x@", "additional_info": {"p": "regex"}})
        );
    }

    #[test]
    fn test_business_rule_translation() {
        let mut domain = BusinessRuleError::new("MaxTeamMembers", "exceeded")
            .with_context([("current", 11)]);
        domain.add_context("max", 10);

        let app = translate(domain.into());

        assert_eq!(app.code(), ResponseCode::BusinessRuleViolation);
        assert_eq!(app.status(), StatusCode::BAD_REQUEST);
        assert!(app.message().contains("MaxTeamMembers"));
        assert_eq!(
            Value::Object(app.additional_info().clone()),
            json!({"rule": "MaxTeamMembers", "context": {"current": 11, "max": 10}})
        );
    }

    #[test]
    fn test_described_domain_failure_translation() {
        let domain = DomainFault::new("SyncConflict", "unknown failure")
            .with_field("custom_field", "custom_value");

        let app = translate(domain.into());

        assert_eq!(app.kind(), ApplicationErrorKind::Internal);
        assert_eq!(app.code(), ResponseCode::InternalServerError);
        assert_eq!(app.message(), "unknown failure");
        assert_eq!(app.additional_info()["custom_field"], "custom_value");
        assert_eq!(app.additional_info()["type"], "SyncConflict");
        assert!(!app.additional_info().contains_key("message"));
    }

    #[test]
    fn test_plain_error_translation() {
        let app = translate_any(anyhow::anyhow!("boom"));

        assert_eq!(app.code(), ResponseCode::InternalServerError);
        assert_eq!(app.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(app.message().contains("boom"));
        assert!(app.additional_info().is_empty());
    }

    #[test]
    fn test_plain_error_keeps_context_chain() {
        let err = std::fs::read("/definitely/not/here")
            .context("loading org chart")
            .unwrap_err();
        let app = translate_any(err);
        assert!(app.message().starts_with("loading org chart: "));
    }

    #[test]
    fn test_wrapped_domain_error_is_unwrapped() {
        let err = anyhow::Error::new(DomainError::entity_not_found("Team", "t9"));
        let app = translate_any(err);
        assert_eq!(app.code(), ResponseCode::NotFound);
        assert_eq!(app.additional_info()["resource_id"], "t9");

        let err = anyhow::Error::new(BusinessRuleError::new("UserInactive", "disabled"));
        assert_eq!(translate_any(err).code(), ResponseCode::BusinessRuleViolation);
    }

    #[test]
    fn test_repository_error_becomes_database_error() {
        let err = anyhow::Error::new(RepositoryError::Query("syntax error at or near".into()))
            .context("fetching company");
        let app = translate_any(err);

        assert_eq!(app.kind(), ApplicationErrorKind::Database);
        assert_eq!(app.code(), ResponseCode::DatabaseError);
        assert_eq!(app.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(app.additional_info().is_empty());
    }

    #[test]
    fn test_missing_row_becomes_not_found() {
        let id = Uuid::new_v4();
        let err = anyhow::Error::new(RepositoryError::MissingRow { table: "team", id })
            .context("loading team");
        let app = translate_any(err);

        assert_eq!(app.kind(), ApplicationErrorKind::ResourceNotFound);
        assert_eq!(app.status(), StatusCode::NOT_FOUND);
        assert_eq!(app.additional_info()["entity_type"], "team");
        assert_eq!(app.additional_info()["resource_id"], json!(id.to_string()));
    }

    #[test]
    fn test_complex_values_are_strings() {
        let now = Utc::now();
        let id = Uuid::parse_str("12345678-1234-5678-1234-567812345678").unwrap();
        let domain = ValidationError::new("data", "complex value").with_value(
            crate::errors::normalize::ContextValue::map([
                ("datetime", crate::errors::normalize::ContextValue::from(now)),
                ("uuid", id.into()),
            ]),
        );

        let app = translate(domain.into());
        let value = &app.additional_info()["value"];

        assert_eq!(value["datetime"], json!(now.to_rfc3339()));
        assert_eq!(value["uuid"], json!(id.to_string()));
    }

    #[test]
    fn test_from_impl_translates() {
        let app: ApplicationError = DomainError::business_rule("UserInactive", "disabled").into();
        assert_eq!(app.additional_info()["rule"], "UserInactive");
    }
}
