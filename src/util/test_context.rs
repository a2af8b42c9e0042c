//! Isolated import pipeline for tests: temporary database, in-memory queues
//! and a fetcher that never touches the network.

use std::sync::Arc;

use crate::application::services::dispatch::QueueProducers;
use crate::application::services::entry_resolver::EntryResolver;
use crate::application::services::import_service::{ImportRequest, ImportService, ImportServiceImpl};
use crate::domain::enrichment::{ContentFetcher, NoopFetcher};
use crate::domain::entry::Entry;
use crate::domain::import::{ImportMode, ImportOptions, ImportSource};
use crate::domain::repositories::repository::EntryRepository;
use crate::infrastructure::queue::MemoryQueue;
use crate::infrastructure::repositories::sqlite::config_store::SqliteConfigStore;
use crate::infrastructure::repositories::sqlite::repository::SqliteEntryRepository;
use crate::util::testing::{init_test_env, setup_test_db, TestDb};

pub const TEST_USER: i32 = 1;

#[derive(Debug)]
pub struct TestContext {
    pub db: TestDb,
    pub repository: Arc<SqliteEntryRepository>,
    pub redis: Arc<MemoryQueue>,
    pub amqp: Arc<MemoryQueue>,
    pub service: Arc<ImportServiceImpl>,
}

impl TestContext {
    /// Inline default mode, working queues, no network
    pub fn new() -> Self {
        Self::with(
            Arc::new(NoopFetcher),
            MemoryQueue::new("import"),
            MemoryQueue::new("import"),
        )
    }

    pub fn with_fetcher(fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self::with(fetcher, MemoryQueue::new("import"), MemoryQueue::new("import"))
    }

    pub fn with(fetcher: Arc<dyn ContentFetcher>, redis: MemoryQueue, amqp: MemoryQueue) -> Self {
        let _ = init_test_env();
        let db = setup_test_db();
        let repository = Arc::new(db.repository.clone());
        let config_store = Arc::new(SqliteConfigStore::new(repository.pool().clone()));
        let redis = Arc::new(redis);
        let amqp = Arc::new(amqp);

        let producers = QueueProducers {
            redis: Some(redis.clone()),
            amqp: Some(amqp.clone()),
        };
        let resolver = EntryResolver::new(repository.clone(), fetcher);
        let service = Arc::new(ImportServiceImpl::new(
            repository.clone(),
            resolver,
            config_store,
            producers,
            ImportMode::Inline,
        ));

        Self {
            db,
            repository,
            redis,
            amqp,
            service,
        }
    }

    /// Instapaper upload for the test user with default options
    pub fn request(&self, content: Option<&str>) -> ImportRequest {
        self.request_with(content, ImportOptions::default())
    }

    pub fn request_with(&self, content: Option<&str>, options: ImportOptions) -> ImportRequest {
        ImportRequest {
            user_id: TEST_USER,
            source: ImportSource::Instapaper,
            content: content.map(|c| c.as_bytes().to_vec()),
            options,
        }
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.repository
            .get_all_for_user(TEST_USER)
            .expect("Failed to load entries")
    }

    pub fn entry(&self, url: &str) -> Option<Entry> {
        self.repository
            .find_by_url_and_user(url, TEST_USER)
            .expect("Failed to look up entry")
    }

    pub fn set_mode(&self, mode: ImportMode) {
        self.service.set_mode(mode).expect("Failed to set import mode");
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_new_context_when_created_then_empty_and_inline() {
        let ctx = TestContext::new();
        assert!(ctx.entries().is_empty());
        assert!(ctx.redis.is_empty());
        assert_eq!(ctx.service.current_mode(), ImportMode::Inline);
    }
}
