// src/application/services/import_service.rs
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::application::error::ApplicationResult;
use crate::application::services::dispatch::{Dispatcher, QueueProducers};
use crate::application::services::entry_resolver::{EntryResolver, Resolution};
use crate::domain::entry::Entry;
use crate::domain::import::{ImportJob, ImportMode, ImportOptions, ImportSource};
use crate::domain::repositories::config_store::ConfigStore;
use crate::domain::repositories::repository::EntryRepository;
use crate::domain::report::{FailureReason, ImportReport, ImportSession};
use crate::infrastructure::repositories::open_export;

/// One uploaded export file
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub user_id: i32,
    pub source: ImportSource,
    /// Raw file bytes; `None` when nothing was uploaded
    pub content: Option<Vec<u8>>,
    pub options: ImportOptions,
}

/// Service interface for bulk imports
pub trait ImportService: Send + Sync {
    /// Run an import. Every outcome, including unusable files, is reported, never raised.
    fn import(&self, request: ImportRequest) -> ImportReport;

    /// Mode the next import run will use
    fn current_mode(&self) -> ImportMode;

    fn set_mode(&self, mode: ImportMode) -> ApplicationResult<()>;

    /// Apply a job taken from a queue, as a consumer would
    fn process_job(&self, payload: &[u8]) -> ApplicationResult<Resolution>;

    fn entries_for_user(&self, user_id: i32) -> ApplicationResult<Vec<Entry>>;
}

pub struct ImportServiceImpl {
    repository: Arc<dyn EntryRepository>,
    resolver: EntryResolver,
    config_store: Arc<dyn ConfigStore>,
    producers: QueueProducers,
    default_mode: ImportMode,
}

impl ImportServiceImpl {
    pub fn new(
        repository: Arc<dyn EntryRepository>,
        resolver: EntryResolver,
        config_store: Arc<dyn ConfigStore>,
        producers: QueueProducers,
        default_mode: ImportMode,
    ) -> Self {
        debug!("Creating new ImportServiceImpl, default mode {}", default_mode);
        Self {
            repository,
            resolver,
            config_store,
            producers,
            default_mode,
        }
    }
}

impl ImportService for ImportServiceImpl {
    #[instrument(skip(self, request), level = "debug", fields(user_id = request.user_id, source = %request.source))]
    fn import(&self, request: ImportRequest) -> ImportReport {
        let Some(content) = request.content else {
            warn!("Import without file");
            return ImportReport::Failed(FailureReason::MissingFile);
        };

        let export = match open_export(request.source, &content) {
            Ok(export) => export,
            Err(e) => {
                warn!("Cannot parse {} export: {}", request.source, e);
                return ImportReport::Failed(FailureReason::MalformedFormat(e.to_string()));
            }
        };

        // Read once: a mode change during the run applies to the next run
        let mode = self.current_mode();
        let dispatcher = Dispatcher::for_mode(mode, &self.resolver, &self.producers)
            .unwrap_or_else(|e| {
                error!("Import mode {} cannot dispatch: {}", mode, e);
                Dispatcher::Unavailable(e.to_string())
            });

        let mut session = ImportSession::new(export.source(), mode);
        for item in export.records() {
            match item {
                Ok(record) => {
                    let outcome =
                        dispatcher.dispatch(request.user_id, export.source(), &record, &request.options);
                    session.record(&outcome);
                }
                Err(e) => {
                    warn!("Skipping row: {}", e);
                    session.record_unparsable();
                }
            }
        }

        let report = session.finish();
        info!("{}", report);
        report
    }

    fn current_mode(&self) -> ImportMode {
        self.config_store.import_mode(self.default_mode)
    }

    #[instrument(skip(self), level = "debug")]
    fn set_mode(&self, mode: ImportMode) -> ApplicationResult<()> {
        self.config_store.set_import_mode(mode)?;
        info!("Import mode set to {}", mode);
        Ok(())
    }

    #[instrument(skip_all, level = "debug")]
    fn process_job(&self, payload: &[u8]) -> ApplicationResult<Resolution> {
        let job = ImportJob::from_payload(payload)?;
        let resolution = self
            .resolver
            .resolve(job.user_id, &job.record, &job.options)
            .map_err(|e| e.context(format!("processing queued job for {}", job.record.url)))?;
        Ok(resolution)
    }

    #[instrument(skip(self), level = "debug")]
    fn entries_for_user(&self, user_id: i32) -> ApplicationResult<Vec<Entry>> {
        Ok(self.repository.get_all_for_user(user_id)?)
    }
}

impl std::fmt::Debug for ImportServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportServiceImpl")
            .field("producers", &self.producers)
            .field("default_mode", &self.default_mode)
            .finish()
    }
}
