//! Company-scoped junction records.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{impl_entity, require_text, Entity, EntityMeta};
use crate::domain::errors::DomainError;

/// A user's membership in a company and their place in its organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyUser {
    #[serde(flatten)]
    pub meta: EntityMeta,
    pub company_id: Uuid,
    pub user_id: Uuid,
    pub emp_no: String,
    pub department_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub responsibility_id: Option<Uuid>,
    pub position_id: Option<Uuid>,
}

impl_entity!(CompanyUser, "CompanyUser");

impl CompanyUser {
    pub fn new(
        company_id: Uuid,
        user_id: Uuid,
        emp_no: &str,
        actor: Option<Uuid>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            meta: EntityMeta::new(actor),
            company_id,
            user_id,
            emp_no: require_text("emp_no", emp_no, 50)?,
            department_id: None,
            team_id: None,
            responsibility_id: None,
            position_id: None,
        })
    }

    pub fn assign_department(&mut self, department_id: Option<Uuid>, actor: Uuid) {
        self.department_id = department_id;
        self.touch(actor);
    }

    pub fn assign_team(&mut self, team_id: Option<Uuid>, actor: Uuid) {
        self.team_id = team_id;
        self.touch(actor);
    }

    pub fn assign_position(&mut self, position_id: Option<Uuid>, actor: Uuid) {
        self.position_id = position_id;
        self.touch(actor);
    }

    pub fn assign_responsibility(&mut self, responsibility_id: Option<Uuid>, actor: Uuid) {
        self.responsibility_id = responsibility_id;
        self.touch(actor);
    }
}

macro_rules! company_link {
    ($(#[$doc:meta])* $ty:ident, $name:literal, $target:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $ty {
            #[serde(flatten)]
            pub meta: EntityMeta,
            pub company_id: Uuid,
            pub $target: Uuid,
        }

        impl_entity!($ty, $name);

        impl $ty {
            pub fn new(company_id: Uuid, $target: Uuid, actor: Option<Uuid>) -> Self {
                Self {
                    meta: EntityMeta::new(actor),
                    company_id,
                    $target,
                }
            }
        }
    };
}

company_link!(
    /// Department available in a company
    CompanyDepartment,
    "CompanyDepartment",
    department_id
);
company_link!(
    /// Team available in a company
    CompanyTeam,
    "CompanyTeam",
    team_id
);
company_link!(
    /// Position available in a company
    CompanyPosition,
    "CompanyPosition",
    position_id
);
company_link!(
    /// Responsibility available in a company
    CompanyResponsibility,
    "CompanyResponsibility",
    responsibility_id
);
