// src/infrastructure/queue/redis_producer.rs
use redis::{Client, Commands, Connection};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::import::ImportJob;
use crate::domain::queue::JobProducer;

/// Pushes jobs onto Redis lists; consumers pop from the left
pub struct RedisJobProducer {
    client: Client,
    prefix: String,
    timeout: Duration,
    conn: Mutex<Option<Connection>>,
}

impl RedisJobProducer {
    /// Validates the URL only; the connection is opened on the first job
    pub fn new(url: &str, prefix: &str, timeout_milliseconds: u64) -> DomainResult<Self> {
        let client = Client::open(url)
            .map_err(|e| DomainError::QueueUnavailable(format!("Invalid Redis URL: {}", e)))?;
        Ok(Self {
            client,
            prefix: prefix.to_string(),
            timeout: Duration::from_millis(timeout_milliseconds),
            conn: Mutex::new(None),
        })
    }

    fn connect(&self) -> redis::RedisResult<Connection> {
        let conn = self.client.get_connection_with_timeout(self.timeout)?;
        conn.set_read_timeout(Some(self.timeout))?;
        conn.set_write_timeout(Some(self.timeout))?;
        debug!("Connected to Redis");
        Ok(conn)
    }
}

impl std::fmt::Debug for RedisJobProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisJobProducer")
            .field("prefix", &self.prefix)
            .field("timeout", &self.timeout)
            .field(
                "connected",
                &self.conn.try_lock().map(|c| c.is_some()).unwrap_or(false),
            )
            .finish()
    }
}

impl JobProducer for RedisJobProducer {
    fn name(&self) -> &'static str {
        "redis"
    }

    #[instrument(skip_all, level = "debug", fields(url = %job.record.url))]
    fn enqueue(&self, job: &ImportJob) -> DomainResult<()> {
        let queue = job.source.queue_name(&self.prefix);
        let payload = job.to_payload()?;

        let mut guard = self
            .conn
            .lock()
            .map_err(|e| DomainError::QueueUnavailable(format!("Redis producer poisoned: {}", e)))?;

        if guard.is_none() {
            let conn = self
                .connect()
                .map_err(|e| DomainError::QueueUnavailable(format!("Redis: {}", e)))?;
            *guard = Some(conn);
        }
        let Some(conn) = guard.as_mut() else {
            return Err(DomainError::QueueUnavailable("Redis: no connection".to_string()));
        };

        match conn.rpush::<_, _, i64>(&queue, payload) {
            Ok(len) => {
                debug!("Queued job on {} (length {})", queue, len);
                Ok(())
            }
            Err(e) => {
                // Reconnect on the next job
                warn!("Redis push to {} failed: {}", queue, e);
                *guard = None;
                Err(DomainError::QueueUnavailable(format!("Redis: {}", e)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::import::{ImportOptions, ImportSource, RawImportRecord};
    use std::env;

    fn job() -> ImportJob {
        ImportJob::new(
            3,
            ImportSource::Instapaper,
            ImportOptions::default(),
            RawImportRecord::new("https://example.com/redis", "Redis").unwrap(),
        )
    }

    #[test]
    fn given_invalid_url_when_new_then_queue_unavailable() {
        let result = RedisJobProducer::new("not-a-redis-url", "import", 100);
        assert!(matches!(result, Err(DomainError::QueueUnavailable(_))));
    }

    #[test]
    fn given_unreachable_server_when_enqueue_then_queue_unavailable() {
        let producer = RedisJobProducer::new("redis://127.0.0.1:1/", "import", 200).unwrap();
        let result = producer.enqueue(&job());
        assert!(matches!(result, Err(DomainError::QueueUnavailable(_))));
    }

    #[test]
    fn given_live_server_when_enqueue_then_job_on_list() {
        let Ok(url) = env::var("READSTASH_TEST_REDIS_URL") else {
            eprintln!("READSTASH_TEST_REDIS_URL not set, skipping");
            return;
        };
        let prefix = format!("readstash-test-{}", std::process::id());
        let producer = RedisJobProducer::new(&url, &prefix, 2000).unwrap();

        producer.enqueue(&job()).unwrap();

        let mut conn = Client::open(url.as_str()).unwrap().get_connection().unwrap();
        let queue = ImportSource::Instapaper.queue_name(&prefix);
        let payload: Option<String> = conn.lpop(&queue, None).unwrap();
        let _: () = conn.del(&queue).unwrap();
        assert_eq!(ImportJob::from_payload(payload.unwrap().as_bytes()).unwrap(), job());
    }
}
