//! Contract of the persistence layer as seen by the error pipeline.
//!
//! Storage itself lives outside this crate; repositories report failures
//! through [`RepositoryError`] so the boundary can render them as
//! `DATABASE_ERROR` without leaking driver details to clients.

use thiserror::Error;
use uuid::Uuid;

use crate::domain::errors::{DomainError, EntityNotFound};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection failed: {0}")]
    Connection(String),

    #[error("database query failed: {0}")]
    Query(String),

    #[error("constraint {constraint} violated on {table}")]
    Constraint { table: String, constraint: String },

    #[error("{table} row {id} does not exist")]
    MissingRow { table: &'static str, id: Uuid },
}

impl RepositoryError {
    /// Lookup failure for a missing row, named after its table
    pub fn missing_row(&self) -> Option<EntityNotFound> {
        match self {
            RepositoryError::MissingRow { table, id } => {
                Some(EntityNotFound::new(*table).with_id(id))
            }
            _ => None,
        }
    }

    /// Reinterpret a missing row as a domain lookup failure.
    ///
    /// Any other failure is handed back unchanged.
    pub fn into_domain(self, entity_type: &str) -> Result<DomainError, Self> {
        match self {
            RepositoryError::MissingRow { id, .. } => {
                Ok(EntityNotFound::new(entity_type).with_id(id).into())
            }
            other => Err(other),
        }
    }
}
