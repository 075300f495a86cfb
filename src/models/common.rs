use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{DomainError, ValidationError};

/// Single-character flag stored as `'Y'` / `'N'`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YesNo {
    #[serde(rename = "Y")]
    Yes,
    #[serde(rename = "N")]
    No,
}

impl YesNo {
    pub fn as_char(self) -> char {
        match self {
            YesNo::Yes => 'Y',
            YesNo::No => 'N',
        }
    }

    pub fn is_yes(self) -> bool {
        self == YesNo::Yes
    }
}

impl From<bool> for YesNo {
    fn from(value: bool) -> Self {
        if value {
            YesNo::Yes
        } else {
            YesNo::No
        }
    }
}

impl TryFrom<char> for YesNo {
    type Error = DomainError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'Y' => Ok(YesNo::Yes),
            'N' => Ok(YesNo::No),
            other => Err(ValidationError::new("yn_flag", "must be 'Y' or 'N'")
                .with_value(other)
                .into()),
        }
    }
}

/// Identity, status and audit columns shared by every stored entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMeta {
    pub id: Uuid,
    pub use_yn: YesNo,
    pub delete_yn: YesNo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub deleted_by: Option<Uuid>,
}

impl EntityMeta {
    /// Fresh active record created now by `actor`
    pub fn new(actor: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            use_yn: YesNo::Yes,
            delete_yn: YesNo::No,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            created_by: actor,
            updated_by: actor,
            deleted_by: None,
        }
    }

    /// Soft delete: the row stays, flagged deleted and no longer in use
    pub fn mark_deleted(&mut self, actor: Uuid) {
        let now = Utc::now();
        self.delete_yn = YesNo::Yes;
        self.use_yn = YesNo::No;
        self.deleted_at = Some(now);
        self.deleted_by = Some(actor);
        self.updated_at = now;
        self.updated_by = Some(actor);
    }

    pub fn touch(&mut self, actor: Uuid) {
        self.updated_at = Utc::now();
        self.updated_by = Some(actor);
    }

    pub fn is_deleted(&self) -> bool {
        self.delete_yn.is_yes()
    }

    pub fn is_active(&self) -> bool {
        self.use_yn.is_yes() && !self.is_deleted()
    }
}

/// Behavior every stored record shares through its [`EntityMeta`]
pub trait Entity {
    /// Name used in not-found errors
    const ENTITY_TYPE: &'static str;

    fn meta(&self) -> &EntityMeta;

    fn meta_mut(&mut self) -> &mut EntityMeta;

    fn id(&self) -> Uuid {
        self.meta().id
    }

    fn mark_deleted(&mut self, actor: Uuid) {
        self.meta_mut().mark_deleted(actor);
    }

    fn touch(&mut self, actor: Uuid) {
        self.meta_mut().touch(actor);
    }

    fn is_deleted(&self) -> bool {
        self.meta().is_deleted()
    }

    fn is_active(&self) -> bool {
        self.meta().is_active()
    }

    fn not_found(id: Uuid) -> DomainError
    where
        Self: Sized,
    {
        DomainError::entity_not_found(Self::ENTITY_TYPE, id)
    }
}

/// Implements [`Entity`] for a struct with a `meta: EntityMeta` field
macro_rules! impl_entity {
    ($ty:ty, $name:literal) => {
        impl $crate::models::common::Entity for $ty {
            const ENTITY_TYPE: &'static str = $name;

            fn meta(&self) -> &$crate::models::common::EntityMeta {
                &self.meta
            }

            fn meta_mut(&mut self) -> &mut $crate::models::common::EntityMeta {
                &mut self.meta
            }
        }
    };
}

pub(crate) use impl_entity;

/// Trimmed, non-empty text no longer than `max` characters
pub(crate) fn require_text(field: &str, value: &str, max: usize) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, "must not be empty").into());
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::new(field, format!("must be at most {max} characters"))
            .with_value(trimmed)
            .with_context([("max_length", max)])
            .into());
    }
    Ok(trimmed.to_string())
}
