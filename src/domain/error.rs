// src/domain/error.rs
use crate::domain::entry::EntryBuilderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid tag: {0}")]
    InvalidTag(String),

    #[error("Malformed export file: {0}")]
    MalformedFormat(String),

    #[error("Invalid record at line {line}: {reason}")]
    InvalidRecord { line: usize, reason: String },

    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    #[error("Cannot fetch content: {0}")]
    EnrichmentFailure(String),

    #[error("Queue unavailable: {0}")]
    QueueUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl DomainError {
    /// Prefix the error message with context, keeping the variant where it carries a message.
    pub fn context<C: Into<String>>(self, context: C) -> Self {
        let context = context.into();
        match self {
            DomainError::InvalidUrl(msg) => DomainError::InvalidUrl(format!("{}: {}", context, msg)),
            DomainError::MalformedFormat(msg) => {
                DomainError::MalformedFormat(format!("{}: {}", context, msg))
            }
            DomainError::EnrichmentFailure(msg) => {
                DomainError::EnrichmentFailure(format!("{}: {}", context, msg))
            }
            DomainError::QueueUnavailable(msg) => {
                DomainError::QueueUnavailable(format!("{}: {}", context, msg))
            }
            DomainError::Repository(msg) => DomainError::Repository(format!("{}: {}", context, msg)),
            DomainError::Other(msg) => DomainError::Other(format!("{}: {}", context, msg)),
            err => DomainError::Other(format!("{}: {}", context, err)),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<EntryBuilderError> for DomainError {
    fn from(e: EntryBuilderError) -> Self {
        DomainError::Other(format!("Cannot build entry: {}", e))
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_queue_error_when_context_added_then_variant_is_kept() {
        let err = DomainError::QueueUnavailable("connection refused".to_string())
            .context("enqueue import.instapaper");

        match err {
            DomainError::QueueUnavailable(msg) => {
                assert_eq!(msg, "enqueue import.instapaper: connection refused")
            }
            other => panic!("Unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn given_record_error_when_context_added_then_becomes_other() {
        let err = DomainError::InvalidRecord {
            line: 3,
            reason: "missing URL".to_string(),
        }
        .context("instapaper");

        assert_eq!(
            err.to_string(),
            "Other error: instapaper: Invalid record at line 3: missing URL"
        );
    }
}
