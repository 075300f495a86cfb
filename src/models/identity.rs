use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::common::{impl_entity, require_text, Entity, EntityMeta};
use crate::domain::errors::{BusinessRuleError, DomainError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    User,
    TeamManager,
    OrgAdmin,
    SysAdmin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "USER",
            UserRole::TeamManager => "TEAM_MANAGER",
            UserRole::OrgAdmin => "ORG_ADMIN",
            UserRole::SysAdmin => "SYS_ADMIN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(UserRole::User),
            "TEAM_MANAGER" => Ok(UserRole::TeamManager),
            "ORG_ADMIN" => Ok(UserRole::OrgAdmin),
            "SYS_ADMIN" => Ok(UserRole::SysAdmin),
            other => Err(ValidationError::new(
                "role",
                "must be one of USER, TEAM_MANAGER, ORG_ADMIN, SYS_ADMIN",
            )
            .with_value(other)
            .into()),
        }
    }
}

/// Fields needed to register a user
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub emp_no: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(flatten)]
    pub meta: EntityMeta,
    pub emp_no: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
    pub company_id: Option<Uuid>,
}

impl_entity!(User, "User");

impl User {
    pub fn new(new: NewUser, actor: Option<Uuid>) -> Result<Self, DomainError> {
        if new.password_hash.is_empty() {
            return Err(ValidationError::new("password", "must not be empty").into());
        }

        Ok(Self {
            meta: EntityMeta::new(actor),
            emp_no: require_text("emp_no", &new.emp_no, 50)?,
            email: validate_email(&new.email)?,
            password_hash: new.password_hash,
            name: require_text("name", &new.name, 100)?,
            role: new.role,
            company_id: new.company_id,
        })
    }

    /// Fails for disabled or deleted accounts
    pub fn ensure_active(&self) -> Result<(), DomainError> {
        if self.is_active() {
            return Ok(());
        }
        Err(BusinessRuleError::new("UserInactive", "user account is inactive")
            .with_context([("user_id", self.id())])
            .with_context([("deleted", self.is_deleted())])
            .into())
    }

    pub fn change_role(&mut self, role: UserRole, actor: Uuid) {
        self.role = role;
        self.touch(actor);
    }
}

fn validate_email(email: &str) -> Result<String, DomainError> {
    let email = require_text("email", email, 255)?;
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
        }
        None => false,
    };
    if !valid {
        return Err(ValidationError::new("email", "is not a valid email address")
            .with_value(email)
            .into());
    }
    Ok(email.to_ascii_lowercase())
}

/// Company data shared by [`Company`] and [`CompanyRegistrationRequest`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub business_registration_number: String,
    pub name: String,
    pub eng_name: String,
    pub address: String,
    pub phone: String,
    pub ceo_name: String,
    pub homepage_url: Option<String>,
}

impl CompanyProfile {
    /// Trim every field and check it against column limits
    pub fn validated(self) -> Result<Self, DomainError> {
        let homepage_url = match self.homepage_url.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(url) => Some(require_text("homepage_url", url, 255)?),
        };

        Ok(Self {
            business_registration_number: validate_business_number(
                &self.business_registration_number,
            )?,
            name: require_text("name", &self.name, 100)?,
            eng_name: require_text("eng_name", &self.eng_name, 100)?,
            address: require_text("address", &self.address, 255)?,
            phone: require_text("phone", &self.phone, 20)?,
            ceo_name: require_text("ceo_name", &self.ceo_name, 100)?,
            homepage_url,
        })
    }
}

/// Registration numbers are ten digits, written `123-45-67890`
fn validate_business_number(value: &str) -> Result<String, DomainError> {
    let digits: String = value.chars().filter(|c| *c != '-').collect();
    if digits.len() != 10 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new(
            "business_registration_number",
            "must be 10 digits, optionally written as 123-45-67890",
        )
        .with_value(value)
        .into());
    }
    Ok(format!("{}-{}-{}", &digits[..3], &digits[3..5], &digits[5..]))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    #[serde(flatten)]
    pub meta: EntityMeta,
    #[serde(flatten)]
    pub profile: CompanyProfile,
}

impl_entity!(Company, "Company");

impl Company {
    pub fn new(profile: CompanyProfile, actor: Option<Uuid>) -> Result<Self, DomainError> {
        Ok(Self {
            meta: EntityMeta::new(actor),
            profile: profile.validated()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "PENDING",
            RegistrationStatus::Approved => "APPROVED",
            RegistrationStatus::Rejected => "REJECTED",
        }
    }
}

/// A request to onboard a company, reviewed once by an administrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRegistrationRequest {
    #[serde(flatten)]
    pub meta: EntityMeta,
    #[serde(flatten)]
    pub profile: CompanyProfile,
    pub status: RegistrationStatus,
    pub requested_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub reject_reason: Option<String>,
    pub approved_company_id: Option<Uuid>,
}

impl_entity!(CompanyRegistrationRequest, "CompanyRegistrationRequest");

impl CompanyRegistrationRequest {
    pub fn new(profile: CompanyProfile, requested_by: Uuid) -> Result<Self, DomainError> {
        Ok(Self {
            meta: EntityMeta::new(Some(requested_by)),
            profile: profile.validated()?,
            status: RegistrationStatus::Pending,
            requested_by,
            approved_by: None,
            approved_at: None,
            rejected_at: None,
            reject_reason: None,
            approved_company_id: None,
        })
    }

    pub fn approve(&mut self, approver: Uuid, company_id: Uuid) -> Result<(), DomainError> {
        self.ensure_pending()?;

        self.status = RegistrationStatus::Approved;
        self.approved_by = Some(approver);
        self.approved_at = Some(Utc::now());
        self.approved_company_id = Some(company_id);
        self.touch(approver);
        Ok(())
    }

    pub fn reject(&mut self, approver: Uuid, reason: &str) -> Result<(), DomainError> {
        self.ensure_pending()?;
        let reason = require_text("reject_reason", reason, 1000)?;

        self.status = RegistrationStatus::Rejected;
        self.rejected_at = Some(Utc::now());
        self.reject_reason = Some(reason);
        self.touch(approver);
        Ok(())
    }

    /// The company to create once the request is approved
    pub fn to_company(&self, actor: Uuid) -> Result<Company, DomainError> {
        Company::new(self.profile.clone(), Some(actor))
    }

    fn ensure_pending(&self) -> Result<(), DomainError> {
        if self.status == RegistrationStatus::Pending {
            return Ok(());
        }
        Err(BusinessRuleError::new(
            "RegistrationAlreadyProcessed",
            format!("registration request is already {}", self.status.as_str()),
        )
        .with_context([("request_id", self.id())])
        .with_context([("status", self.status.as_str())])
        .into())
    }
}
