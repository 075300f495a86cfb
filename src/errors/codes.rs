//! Response code registry.
//!
//! Every code is four digits: the domain (1 common, 2 auth, 3 task, 4 user and
//! organization, 5 attendance, 6 file, 7 notification, 9 system), then the
//! category (0 basic, 1 document, 2 state, 3 auth, 4 validation, 5 external,
//! 6 business logic, 7 infrastructure), then two subcategory digits.

use lazy_static::lazy_static;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;

use super::normalize::{value_to_text, Payload};

/// Registry row for a single response code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeEntry {
    pub name: &'static str,
    pub code: u16,
    pub template: &'static str,
}

macro_rules! response_codes {
    ($( $(#[$meta:meta])* $variant:ident = ($code:literal, $name:literal, $template:literal), )+) => {
        /// Symbolic response codes for API envelopes
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ResponseCode {
            $( $(#[$meta])* $variant, )+
        }

        impl ResponseCode {
            /// Every registered code, in declaration order
            pub const ALL: &'static [ResponseCode] = &[ $( ResponseCode::$variant, )+ ];

            pub const fn entry(self) -> CodeEntry {
                match self {
                    $( ResponseCode::$variant => CodeEntry {
                        name: $name,
                        code: $code,
                        template: $template,
                    }, )+
                }
            }
        }
    };
}

response_codes! {
    Success = (1000, "SUCCESS", "The request was processed successfully."),

    // Common (1xxx)
    NotFound = (1001, "NOT_FOUND", "The requested resource could not be found."),
    ValidationError = (1403, "VALIDATION_ERROR", "The input value is invalid."),
    BusinessRuleViolation = (1607, "BUSINESS_RULE_VIOLATION", "Business rule '{rule}' was violated."),

    // Auth (2xxx)
    AuthInvalidToken = (2303, "AUTH_INVALID_TOKEN", "The authentication token is invalid."),
    AuthInvalidCredentials = (2304, "AUTH_INVALID_CREDENTIALS", "The user ID or password is incorrect."),
    AuthTokenExpired = (2305, "AUTH_TOKEN_EXPIRED", "The {token_type} token has expired."),
    AuthAccessDenied = (2314, "AUTH_ACCESS_DENIED", "You do not have permission to perform this action."),
    AuthRefreshTokenExpired = (2315, "AUTH_REFRESH_TOKEN_EXPIRED", "The refresh token has expired. Please sign in again."),

    // Task (3xxx)
    TaskNotFound = (3001, "TASK_NOT_FOUND", "The task could not be found."),
    ReportGenerationFailed = (3106, "REPORT_GENERATION_FAILED", "Report generation failed."),
    TaskInvalidStatus = (3203, "TASK_INVALID_STATUS", "The task status is invalid."),
    TaskAlreadyAssigned = (3602, "TASK_ALREADY_ASSIGNED", "The task is already assigned."),
    TaskDueDatePassed = (3605, "TASK_DUE_DATE_PASSED", "The task due date has passed."),
    RewardInsufficientPoints = (3615, "REWARD_INSUFFICIENT_POINTS", "There are not enough points to grant the reward."),

    // User and organization (4xxx)
    UserNotFound = (4001, "USER_NOT_FOUND", "The user could not be found."),
    UserAlreadyExists = (4002, "USER_ALREADY_EXISTS", "The user already exists."),
    UserInactive = (4203, "USER_INACTIVE", "The user is inactive."),
    CompanyNotFound = (4601, "COMPANY_NOT_FOUND", "The company could not be found."),
    CompanyAlreadyExists = (4602, "COMPANY_ALREADY_EXISTS", "The company already exists."),
    DepartmentNotFound = (4611, "DEPARTMENT_NOT_FOUND", "The department could not be found."),
    TeamNotFound = (4621, "TEAM_NOT_FOUND", "The team could not be found."),

    // Attendance (5xxx)
    AttendanceAlreadyChecked = (5002, "ATTENDANCE_ALREADY_CHECKED", "Check-in or check-out is already recorded."),
    AttendanceInvalidTime = (5403, "ATTENDANCE_INVALID_TIME", "The attendance time is invalid."),
    AttendanceLocationRequired = (5413, "ATTENDANCE_LOCATION_REQUIRED", "A location is required for attendance."),
    WorkingHoursExceeded = (5605, "WORKING_HOURS_EXCEEDED", "The daily working hours limit was exceeded."),

    // File (6xxx)
    FileNotFound = (6001, "FILE_NOT_FOUND", "The file could not be found."),
    FileUploadFailed = (6006, "FILE_UPLOAD_FAILED", "The file upload failed."),
    ExportFailed = (6106, "EXPORT_FAILED", "The file export failed."),
    FileTypeNotAllowed = (6403, "FILE_TYPE_NOT_ALLOWED", "The file type is not allowed."),
    FileSizeExceeded = (6405, "FILE_SIZE_EXCEEDED", "The file exceeds the maximum size of {max_size} bytes."),

    // Notification (7xxx)
    PushTokenInvalid = (7503, "PUSH_TOKEN_INVALID", "The push token is invalid."),
    NotificationSendFailed = (7506, "NOTIFICATION_SEND_FAILED", "The notification could not be sent."),
    EmailSendFailed = (7516, "EMAIL_SEND_FAILED", "The email could not be sent."),

    // System (9xxx)
    ExternalServiceError = (9506, "EXTERNAL_SERVICE_ERROR", "An external service call failed."),
    ServiceUnavailable = (9706, "SERVICE_UNAVAILABLE", "The service is temporarily unavailable."),
    InternalServerError = (9708, "INTERNAL_SERVER_ERROR", "An internal server error occurred."),
    DatabaseError = (9718, "DATABASE_ERROR", "A database error occurred."),
    RedisError = (9728, "REDIS_ERROR", "A cache server error occurred."),
}

lazy_static! {
    static ref BY_CODE: HashMap<u16, ResponseCode> = ResponseCode::ALL
        .iter()
        .map(|code| (code.code(), *code))
        .collect();
}

/// Registry integrity failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("response code {code} is shared by {}", .names.join(", "))]
    DuplicateCode {
        code: u16,
        names: Vec<&'static str>,
    },
}

impl ResponseCode {
    pub fn code(self) -> u16 {
        self.entry().code
    }

    pub fn name(self) -> &'static str {
        self.entry().name
    }

    pub fn template(self) -> &'static str {
        self.entry().template
    }

    pub fn is_success(self) -> bool {
        self == ResponseCode::Success
    }

    /// Look up a code by its numeric identifier
    pub fn from_code(code: u16) -> Option<Self> {
        BY_CODE.get(&code).copied()
    }

    /// Render the template with named arguments.
    ///
    /// With no arguments the raw template is returned as is. Otherwise every
    /// `{name}` is replaced by the matching argument once, `{{` and `}}`
    /// collapse to literal braces, and placeholders without an argument stay
    /// verbatim.
    pub fn format_message(self, args: &Payload) -> String {
        if args.is_empty() {
            return self.template().to_string();
        }
        render_template(self.template(), args)
    }

    /// Check that no two symbolic codes share a numeric identifier
    pub fn verify_registry() -> Result<(), RegistryError> {
        check_unique(Self::ALL)
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.code())
    }
}

fn check_unique(codes: &[ResponseCode]) -> Result<(), RegistryError> {
    let mut seen: BTreeMap<u16, Vec<&'static str>> = BTreeMap::new();
    for code in codes {
        seen.entry(code.code()).or_default().push(code.name());
    }

    match seen.into_iter().find(|(_, names)| names.len() > 1) {
        Some((code, names)) => Err(RegistryError::DuplicateCode { code, names }),
        None => Ok(()),
    }
}

fn render_template(template: &str, args: &Payload) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("{{") {
            out.push('{');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("}}") {
            out.push('}');
            rest = after;
        } else if let (true, Some(end)) = (tail.starts_with('{'), tail.find('}')) {
            match args.get(&tail[1..end]) {
                Some(value) => out.push_str(&value_to_text(value)),
                None => out.push_str(&tail[..=end]),
            }
            rest = &tail[end + 1..];
        } else {
            out.push_str(&tail[..1]);
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}
