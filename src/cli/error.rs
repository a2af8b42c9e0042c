// src/cli/error.rs
use crate::application::error::ApplicationError;
use crate::domain::error::DomainError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The import produced a failure report; the report has been printed
    #[error("Import failed: {0}")]
    ImportFailed(String),

    #[error("Application error: {0}")]
    Application(#[from] ApplicationError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Other(String),
}

impl CliError {
    pub fn context<C: Into<String>>(self, context: C) -> Self {
        match self {
            CliError::CommandFailed(msg) => {
                CliError::CommandFailed(format!("{}: {}", context.into(), msg))
            }
            CliError::InvalidInput(msg) => {
                CliError::InvalidInput(format!("{}: {}", context.into(), msg))
            }
            CliError::Application(err) => CliError::Application(err.context(context)),
            CliError::Other(msg) => CliError::Other(format!("{}: {}", context.into(), msg)),
            err => CliError::Other(format!("{}: {}", context.into(), err)),
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidInput(_) => crate::exitcode::USAGE,
            CliError::ImportFailed(_) => crate::exitcode::IMPORT_FAILED,
            _ => crate::exitcode::SOFTWARE,
        }
    }
}

impl From<DomainError> for CliError {
    fn from(err: DomainError) -> Self {
        CliError::Application(ApplicationError::Domain(err))
    }
}

impl From<crate::infrastructure::repositories::sqlite::error::SqliteRepositoryError> for CliError {
    fn from(
        err: crate::infrastructure::repositories::sqlite::error::SqliteRepositoryError,
    ) -> Self {
        CliError::Application(ApplicationError::Domain(err.into()))
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exitcode;

    #[test]
    fn given_errors_when_exit_code_then_mapped() {
        assert_eq!(CliError::InvalidInput("x".into()).exit_code(), exitcode::USAGE);
        assert_eq!(CliError::ImportFailed("x".into()).exit_code(), exitcode::IMPORT_FAILED);
        assert_eq!(CliError::Other("x".into()).exit_code(), exitcode::SOFTWARE);
    }

    #[test]
    fn given_invalid_input_when_context_then_prefixed() {
        let err = CliError::InvalidInput("bad mode".into()).context("import-mode");
        assert_eq!(err.to_string(), "Invalid input: import-mode: bad mode");
    }
}
