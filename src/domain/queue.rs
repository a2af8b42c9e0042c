// src/domain/queue.rs
use crate::domain::error::DomainResult;
use crate::domain::import::ImportJob;
use std::fmt::Debug;

/// Accepts serialized import jobs for out-of-band processing.
///
/// Implementations fail with `DomainError::QueueUnavailable` on transport errors.
/// A job stays on its queue until a consumer takes it; producers never wait for completion.
pub trait JobProducer: Send + Sync + Debug {
    /// Backend name for logs and reports
    fn name(&self) -> &'static str;

    fn enqueue(&self, job: &ImportJob) -> DomainResult<()>;
}
