// src/infrastructure/repositories/sqlite/error.rs

use crate::domain::error::DomainError;
use diesel::result::Error as DieselError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqliteRepositoryError {
    #[error("Query failed: {0}")]
    Query(#[from] DieselError),

    #[error("Connection pool: {0}")]
    Pool(String),

    #[error("No entry with ID {0}")]
    EntryNotFound(i32),

    /// A stored row does not form a valid domain value
    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    /// The store contradicts a write made in the same transaction
    #[error("Inconsistent store: {0}")]
    Inconsistent(String),
}

pub type SqliteResult<T> = Result<T, SqliteRepositoryError>;

impl From<SqliteRepositoryError> for DomainError {
    fn from(err: SqliteRepositoryError) -> Self {
        match err {
            SqliteRepositoryError::EntryNotFound(id) => DomainError::EntryNotFound(id.to_string()),
            SqliteRepositoryError::Query(DieselError::DatabaseError(_, info)) => {
                DomainError::Repository(format!("Database error: {}", info.message()))
            }
            SqliteRepositoryError::Io(e) => DomainError::Io(e),
            other => DomainError::Repository(other.to_string()),
        }
    }
}
