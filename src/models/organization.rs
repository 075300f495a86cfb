//! Named organizational units. Each is scoped to companies through the
//! junction records in [`super::mappings`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{impl_entity, require_text, Entity, EntityMeta};
use crate::domain::errors::DomainError;

const NAME_MAX_LEN: usize = 100;

macro_rules! organization_unit {
    ($(#[$doc:meta])* $ty:ident, $name:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $ty {
            #[serde(flatten)]
            pub meta: EntityMeta,
            pub name: String,
        }

        impl_entity!($ty, $name);

        impl $ty {
            pub fn new(name: &str, actor: Option<Uuid>) -> Result<Self, DomainError> {
                Ok(Self {
                    meta: EntityMeta::new(actor),
                    name: require_text("name", name, NAME_MAX_LEN)?,
                })
            }

            pub fn rename(&mut self, name: &str, actor: Uuid) -> Result<(), DomainError> {
                self.name = require_text("name", name, NAME_MAX_LEN)?;
                self.touch(actor);
                Ok(())
            }
        }
    };
}

organization_unit!(
    /// Department, e.g. "Engineering"
    Department,
    "Department"
);
organization_unit!(
    /// Team inside a company
    Team,
    "Team"
);
organization_unit!(
    /// Job grade, e.g. "Manager"
    Position,
    "Position"
);
organization_unit!(
    /// Role held within a unit, e.g. "Team Lead"
    Responsibility,
    "Responsibility"
);
