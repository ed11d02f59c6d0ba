//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`KeyNotFound`] thrown when a user-scoped lookup finds nothing.
//! - [`InUse`] thrown when a delete is blocked by dependent records.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`InUse`]: EngineError::InUse
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Missing field: {0}")]
    MissingField(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Category mismatch: {0}")]
    CategoryMismatch(String),
    #[error("Still in use: {0}")]
    InUse(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::MissingField(a), Self::MissingField(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::CategoryMismatch(a), Self::CategoryMismatch(b)) => a == b,
            (Self::InUse(a), Self::InUse(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
