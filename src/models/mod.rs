//! Identity and organization records.

pub mod common;
pub mod identity;
pub mod mappings;
pub mod organization;

pub use common::{Entity, EntityMeta, YesNo};
pub use identity::{
    Company, CompanyProfile, CompanyRegistrationRequest, NewUser, RegistrationStatus, User,
    UserRole,
};
pub use mappings::{
    CompanyDepartment, CompanyPosition, CompanyResponsibility, CompanyTeam, CompanyUser,
};
pub use organization::{Department, Position, Responsibility, Team};
