pub mod errors;

pub use errors::{BusinessRuleError, DomainError, DomainFault, EntityNotFound, ToDict, ValidationError};
