// src/infrastructure/queue/mod.rs
pub mod amqp_producer;
pub mod redis_producer;

use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::import::ImportJob;
use crate::domain::queue::JobProducer;

pub use amqp_producer::AmqpJobProducer;
pub use redis_producer::RedisJobProducer;

/// In-process queue of serialized jobs.
///
/// Used when the pipeline is embedded without a broker and as the queue in tests.
#[derive(Debug)]
pub struct MemoryQueue {
    prefix: String,
    available: bool,
    jobs: Mutex<VecDeque<(String, String)>>,
}

impl MemoryQueue {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            available: true,
            jobs: Mutex::new(VecDeque::new()),
        }
    }

    /// A queue whose broker is down: every enqueue fails
    pub fn unavailable(prefix: &str) -> Self {
        Self {
            available: false,
            ..Self::new(prefix)
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().map(|jobs| jobs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take the oldest job as (queue name, payload)
    pub fn pop(&self) -> Option<(String, String)> {
        self.jobs.lock().ok().and_then(|mut jobs| jobs.pop_front())
    }
}

impl JobProducer for MemoryQueue {
    fn name(&self) -> &'static str {
        "memory"
    }

    #[instrument(skip_all, level = "debug", fields(url = %job.record.url))]
    fn enqueue(&self, job: &ImportJob) -> DomainResult<()> {
        if !self.available {
            return Err(DomainError::QueueUnavailable(
                "memory queue is unavailable".to_string(),
            ));
        }

        let queue = job.source.queue_name(&self.prefix);
        let payload = job.to_payload()?;
        self.jobs
            .lock()
            .map_err(|e| DomainError::QueueUnavailable(format!("memory queue poisoned: {}", e)))?
            .push_back((queue.clone(), payload));
        debug!("Queued job on {}", queue);
        Ok(())
    }
}
