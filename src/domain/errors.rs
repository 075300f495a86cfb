//! Domain-layer failures.
//!
//! Business code returns the narrowest [`DomainError`] variant it can. These
//! types carry structured context but never log; logging happens when the
//! error is translated at the application boundary.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::errors::normalize::{normalize, normalize_map, value_to_text, ContextValue, Payload};

/// Serializable description of an error, used for unclassified failures
pub trait ToDict {
    fn to_dict(&self) -> Payload;
}

/// An entity lookup came back empty
#[derive(Debug, Clone, PartialEq)]
pub struct EntityNotFound {
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub context: Payload,
}

impl EntityNotFound {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: None,
            context: Payload::new(),
        }
    }

    pub fn with_id(mut self, entity_id: impl ToString) -> Self {
        self.entity_id = Some(entity_id.to_string());
        self
    }

    pub fn with_context<K, V>(mut self, context: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<ContextValue>,
    {
        self.context.extend(normalize_map(context));
        self
    }
}

impl fmt::Display for EntityNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entity_id {
            Some(id) => write!(f, "{} with ID {} not found", self.entity_type, id),
            None => write!(f, "{} not found", self.entity_type),
        }
    }
}

impl std::error::Error for EntityNotFound {}

impl ToDict for EntityNotFound {
    fn to_dict(&self) -> Payload {
        let mut dict = header("EntityNotFound", self);
        dict.insert("entity_type".into(), Value::String(self.entity_type.clone()));
        dict.insert(
            "entity_id".into(),
            self.entity_id.clone().map_or(Value::Null, Value::String),
        );
        dict.insert("additional_info".into(), Value::Object(self.context.clone()));
        dict
    }
}

/// A value failed a domain validation rule
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub invalid_value: Value,
    pub context: Payload,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            invalid_value: Value::Null,
            context: Payload::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<ContextValue>) -> Self {
        self.invalid_value = normalize(value.into());
        self
    }

    pub fn with_context<K, V>(mut self, context: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<ContextValue>,
    {
        self.context.extend(normalize_map(context));
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.invalid_value.is_null() {
            write!(f, "Validation failed: {} - {}", self.field, self.message)
        } else {
            write!(
                f,
                "Validation failed: {} ({}) - {}",
                self.field,
                value_to_text(&self.invalid_value),
                self.message
            )
        }
    }
}

impl std::error::Error for ValidationError {}

impl ToDict for ValidationError {
    fn to_dict(&self) -> Payload {
        let mut dict = header("ValidationError", self);
        dict.insert("field".into(), Value::String(self.field.clone()));
        dict.insert("value".into(), self.invalid_value.clone());
        dict.insert("additional_info".into(), Value::Object(self.context.clone()));
        dict
    }
}

/// A business rule was violated
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessRuleError {
    pub rule: String,
    pub detail: String,
    pub context: Payload,
}

impl BusinessRuleError {
    pub fn new(rule: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            detail: detail.into(),
            context: Payload::new(),
        }
    }

    pub fn with_context<K, V>(mut self, context: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<ContextValue>,
    {
        self.context.extend(normalize_map(context));
        self
    }

    /// Attach more context while the error is still on the raising call stack
    pub fn add_context(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.context.insert(key.into(), normalize(value.into()));
    }
}

impl fmt::Display for BusinessRuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Business rule violation ({}): {}", self.rule, self.detail)
    }
}

impl std::error::Error for BusinessRuleError {}

impl ToDict for BusinessRuleError {
    fn to_dict(&self) -> Payload {
        let mut dict = header("BusinessRuleError", self);
        dict.insert("rule".into(), Value::String(self.rule.clone()));
        dict.insert("detail".into(), Value::String(self.detail.clone()));
        dict.insert("context".into(), Value::Object(self.context.clone()));
        dict
    }
}

/// A domain failure with no dedicated variant
#[derive(Debug, Clone, PartialEq)]
pub struct DomainFault {
    pub kind: String,
    pub message: String,
    pub fields: Payload,
}

impl DomainFault {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            fields: Payload::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.fields.insert(key.into(), normalize(value.into()));
        self
    }
}

impl fmt::Display for DomainFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for DomainFault {}

impl ToDict for DomainFault {
    fn to_dict(&self) -> Payload {
        let mut dict = header(&self.kind, self);
        for (key, value) in &self.fields {
            dict.insert(key.clone(), value.clone());
        }
        dict
    }
}

fn header(kind: &str, error: &dyn fmt::Display) -> Payload {
    let mut dict = Payload::new();
    dict.insert("type".into(), Value::String(kind.to_string()));
    dict.insert("message".into(), Value::String(error.to_string()));
    dict
}

/// Every failure the domain layer can raise
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error(transparent)]
    EntityNotFound(#[from] EntityNotFound),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    BusinessRule(#[from] BusinessRuleError),

    #[error(transparent)]
    Other(#[from] DomainFault),
}

impl DomainError {
    pub fn entity_not_found(entity_type: impl Into<String>, entity_id: impl ToString) -> Self {
        EntityNotFound::new(entity_type).with_id(entity_id).into()
    }

    pub fn validation(
        field: impl Into<String>,
        message: impl Into<String>,
        value: impl Into<ContextValue>,
    ) -> Self {
        ValidationError::new(field, message).with_value(value).into()
    }

    pub fn business_rule(rule: impl Into<String>, detail: impl Into<String>) -> Self {
        BusinessRuleError::new(rule, detail).into()
    }
}

impl ToDict for DomainError {
    fn to_dict(&self) -> Payload {
        match self {
            DomainError::EntityNotFound(e) => e.to_dict(),
            DomainError::Validation(e) => e.to_dict(),
            DomainError::BusinessRule(e) => e.to_dict(),
            DomainError::Other(e) => e.to_dict(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn test_entity_not_found_message() {
        let err = EntityNotFound::new("User").with_id("u1");
        assert_eq!(err.to_string(), "User with ID u1 not found");

        let err = EntityNotFound::new("Team");
        assert_eq!(err.to_string(), "Team not found");
    }

    #[test]
    fn test_entity_not_found_accepts_uuid_ids() {
        let id = Uuid::nil();
        let err = DomainError::entity_not_found("Company", id);
        match err {
            DomainError::EntityNotFound(e) => {
                assert_eq!(e.entity_id.as_deref(), Some("00000000-0000-0000-0000-000000000000"))
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_entity_not_found_to_dict() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let err = EntityNotFound::new("User")
            .with_id("user123")
            .with_context([("last_login", date)]);

        assert_eq!(
            Value::Object(err.to_dict()),
            json!({
                "type": "EntityNotFound",
                "message": "User with ID user123 not found",
                "entity_type": "User",
                "entity_id": "user123",
                "additional_info": {"last_login": "2024-03-01"},
            })
        );
    }

    #[test]
    fn test_validation_message_includes_value() {
        let err = ValidationError::new("email", "bad format").with_value("x@");
        assert_eq!(err.to_string(), "Validation failed: email (x@) - bad format");

        let err = ValidationError::new("email", "is required");
        assert_eq!(err.to_string(), "Validation failed: email - is required");
    }

    #[test]
    fn test_validation_value_is_normalized() {
        let id = Uuid::nil();
        let err = ValidationError::new("data", "complex value")
            .with_value(ContextValue::map([("uuid", id)]))
            .with_context([("p", "regex")]);

        let dict = err.to_dict();
        assert_eq!(dict["value"], json!({"uuid": "00000000-0000-0000-0000-000000000000"}));
        assert_eq!(dict["additional_info"], json!({"p": "regex"}));
        assert_eq!(dict["type"], "ValidationError");
    }

    #[test]
    fn test_business_rule_add_context() {
        let mut err = BusinessRuleError::new("MaxTeamMembers", "exceeded")
            .with_context([("current", 11), ("max", 10)]);
        err.add_context("team_id", Uuid::nil());

        assert_eq!(err.to_string(), "Business rule violation (MaxTeamMembers): exceeded");
        assert_eq!(
            Value::Object(err.context.clone()),
            json!({
                "current": 11,
                "max": 10,
                "team_id": "00000000-0000-0000-0000-000000000000",
            })
        );

        let dict = err.to_dict();
        assert_eq!(dict["rule"], "MaxTeamMembers");
        assert_eq!(dict["detail"], "exceeded");
        assert_eq!(dict["context"]["current"], 11);
    }

    #[test]
    fn test_domain_fault_to_dict() {
        let err = DomainFault::new("QuotaExhausted", "unknown failure")
            .with_field("custom_field", "custom_value");

        let dict = DomainError::from(err).to_dict();
        assert_eq!(dict["type"], "QuotaExhausted");
        assert_eq!(dict["message"], "unknown failure");
        assert_eq!(dict["custom_field"], "custom_value");
    }

    #[test]
    fn test_domain_error_display_is_transparent() {
        let err = DomainError::business_rule("UserInactive", "user is disabled");
        assert_eq!(err.to_string(), "Business rule violation (UserInactive): user is disabled");
    }
}
