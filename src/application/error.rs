// src/application/error.rs
use crate::domain::error::DomainError;
use crate::domain::import::ImportMode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("No producer configured for import mode '{0}'")]
    ProducerNotConfigured(ImportMode),

    #[error("{0}")]
    Other(String),
}

impl ApplicationError {
    pub fn context<C: Into<String>>(self, context: C) -> Self {
        match self {
            ApplicationError::Other(msg) => {
                ApplicationError::Other(format!("{}: {}", context.into(), msg))
            }
            ApplicationError::Domain(err) => ApplicationError::Domain(err.context(context)),
            err => ApplicationError::Other(format!("{}: {}", context.into(), err)),
        }
    }
}

impl From<std::io::Error> for ApplicationError {
    fn from(err: std::io::Error) -> Self {
        ApplicationError::Domain(DomainError::Io(err))
    }
}

pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_domain_error_when_context_then_message_prefixed() {
        let err: ApplicationError = DomainError::QueueUnavailable("down".to_string()).into();
        let err = err.context("dispatching job");
        assert_eq!(
            err.to_string(),
            "Domain error: Queue unavailable: dispatching job: down"
        );
    }

    #[test]
    fn given_missing_producer_when_display_then_names_mode() {
        let err = ApplicationError::ProducerNotConfigured(ImportMode::Amqp);
        assert_eq!(err.to_string(), "No producer configured for import mode 'amqp'");
    }
}
