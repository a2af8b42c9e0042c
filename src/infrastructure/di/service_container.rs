use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::dispatch::QueueProducers;
use crate::application::services::entry_resolver::EntryResolver;
use crate::application::services::import_service::{ImportService, ImportServiceImpl};
use crate::config::Settings;
use crate::domain::enrichment::ContentFetcher;
use crate::domain::queue::JobProducer;
use crate::domain::repositories::config_store::ConfigStore;
use crate::infrastructure::http::HttpContentFetcher;
use crate::infrastructure::queue::{AmqpJobProducer, RedisJobProducer};
use crate::infrastructure::repositories::sqlite::config_store::SqliteConfigStore;
use crate::infrastructure::repositories::sqlite::repository::SqliteEntryRepository;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Production service container - single source of truth for service creation
pub struct ServiceContainer {
    pub entry_repository: Arc<SqliteEntryRepository>,
    pub config_store: Arc<dyn ConfigStore>,
    pub fetcher: Arc<dyn ContentFetcher>,
    pub producers: QueueProducers,
    pub import_service: Arc<dyn ImportService>,
}

impl ServiceContainer {
    /// Create all services with explicit dependency injection
    pub fn new(config: &Settings) -> ApplicationResult<Self> {
        let entry_repository = Self::create_repository(&config.db_url)?;
        let config_store: Arc<dyn ConfigStore> =
            Arc::new(SqliteConfigStore::new(entry_repository.pool().clone()));
        let fetcher = Self::create_fetcher(config)?;
        let producers = Self::create_producers(config);

        let resolver = EntryResolver::new(entry_repository.clone(), fetcher.clone());
        let import_service = Arc::new(ImportServiceImpl::new(
            entry_repository.clone(),
            resolver,
            config_store.clone(),
            producers.clone(),
            config.import.default_mode,
        ));

        Ok(Self {
            entry_repository,
            config_store,
            fetcher,
            producers,
            import_service,
        })
    }

    fn create_repository(db_url: &str) -> ApplicationResult<Arc<SqliteEntryRepository>> {
        if !Path::new(db_url).exists() {
            return Err(ApplicationError::Other(format!(
                "Database not found at '{}'. Create it with 'readstash create-db {}' or set READSTASH_DB_URL",
                db_url, db_url
            )));
        }

        // Runs pending migrations
        let repository = SqliteEntryRepository::from_url(db_url).map_err(|e| {
            ApplicationError::Other(format!("Failed to create SQLite entry repository: {}", e))
        })?;

        Ok(Arc::new(repository))
    }

    fn create_fetcher(config: &Settings) -> ApplicationResult<Arc<dyn ContentFetcher>> {
        let fetcher =
            HttpContentFetcher::new(config.import.fetch_timeout_ms, &config.import.user_agent)?;
        Ok(Arc::new(fetcher))
    }

    /// Producers connect on first use; a producer with an unusable URL is left out
    fn create_producers(config: &Settings) -> QueueProducers {
        let prefix = &config.import.queue_prefix;
        let timeout = config.import.queue_timeout_ms;

        let redis = match RedisJobProducer::new(&config.redis.url, prefix, timeout) {
            Ok(producer) => Some(Arc::new(producer) as Arc<dyn JobProducer>),
            Err(e) => {
                warn!("Redis queue disabled: {}", e);
                None
            }
        };

        let amqp = match AmqpJobProducer::new(&config.amqp.url, &config.amqp.exchange, prefix, timeout)
        {
            Ok(producer) => Some(Arc::new(producer) as Arc<dyn JobProducer>),
            Err(e) => {
                warn!("AMQP queue disabled: {}", e);
                None
            }
        };

        let producers = QueueProducers { redis, amqp };
        debug!("Queue producers: {:?}", producers);
        producers
    }
}

impl std::fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("entry_repository", &"Arc<SqliteEntryRepository>")
            .field("config_store", &"Arc<dyn ConfigStore>")
            .field("fetcher", &self.fetcher)
            .field("producers", &self.producers)
            .field("import_service", &"Arc<dyn ImportService>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::import::ImportMode;
    use crate::util::testing::setup_test_db;

    #[test]
    fn given_missing_db_when_new_then_error_with_hint() {
        let settings = Settings {
            db_url: "/nonexistent/dir/readstash.db".to_string(),
            ..Settings::default()
        };
        let err = ServiceContainer::new(&settings).unwrap_err();
        assert!(err.to_string().contains("create-db"));
    }

    #[test]
    fn given_existing_db_when_new_then_services_wired() {
        let db = setup_test_db();
        let mut settings = Settings {
            db_url: db.path().to_string_lossy().into_owned(),
            ..Settings::default()
        };
        settings.import.default_mode = ImportMode::Amqp;
        settings.redis.url = "not a url".to_string();

        let container = ServiceContainer::new(&settings).unwrap();

        assert_eq!(container.import_service.current_mode(), ImportMode::Amqp);
        assert!(container.producers.redis.is_none());
        assert!(container.producers.amqp.is_some());
    }
}
