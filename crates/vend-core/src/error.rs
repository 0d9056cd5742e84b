//! Core error type shared by the store, the services and the text-generation
//! adapter.
//!
//! The store never recovers from a backend error and the services never
//! translate one: whatever is raised here reaches the HTTP layer unchanged.

use std::time::Duration;

use sqlx::error::ErrorKind;
use thiserror::Error;

/// All failures of the data-access contract.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A required field is empty or malformed.
    #[error("dados inválidos: {0}")]
    Validation(String),

    /// An identity string is not a positive decimal integer.
    #[error("ID inválido: {0:?}")]
    InvalidIdentifier(String),

    /// No record of `entity` has identity `id`.
    #[error("{entity} {id} não encontrado(a)")]
    NotFound { entity: &'static str, id: i64 },

    /// The operation did not complete within the per-call budget.
    #[error("{operation} excedeu o tempo limite de {after:?}")]
    Timeout { operation: &'static str, after: Duration },

    /// The external text-generation service failed.
    #[error("falha no serviço externo: {0}")]
    ExternalService(String),

    /// Connectivity, constraint or decoding failure in the store.
    #[error("erro de armazenamento: {0}")]
    Storage(sqlx::Error),

    /// The capability exists in the contract but is not wired in this
    /// deployment.
    #[error("{0}: método não implementado")]
    Unimplemented(&'static str),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        CoreError::NotFound { entity, id }
    }
}

impl From<sqlx::Error> for CoreError {
    /// `CHECK` / `NOT NULL` violations come from the schema enforcing
    /// required fields and surface as [`CoreError::Validation`]; everything
    /// else stays a storage error.
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if matches!(db.kind(), ErrorKind::CheckViolation | ErrorKind::NotNullViolation) {
                return CoreError::Validation(db.message().to_owned());
            }
        }
        CoreError::Storage(e)
    }
}
