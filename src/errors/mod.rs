//! Error pipeline: registry, normalization, application errors, translation
//! and the HTTP envelope.

pub mod application;
pub mod codes;
pub mod normalize;
pub mod response;
pub mod translator;

pub use application::{ApplicationError, ApplicationErrorKind, AuthFailure, TokenKind};
pub use codes::{RegistryError, ResponseCode};
pub use normalize::{normalize, ContextValue, Payload};
pub use response::{render, ApiResponse, ErrorBody};
pub use translator::{translate, translate_any};
