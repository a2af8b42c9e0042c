// src/application/services/dispatch.rs
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::entry_resolver::EntryResolver;
use crate::domain::import::{ImportJob, ImportMode, ImportOptions, ImportSource, RawImportRecord};
use crate::domain::queue::JobProducer;
use crate::domain::report::RecordOutcome;

/// Producers for the queue modes; a mode without producer cannot dispatch
#[derive(Clone, Default)]
pub struct QueueProducers {
    pub redis: Option<Arc<dyn JobProducer>>,
    pub amqp: Option<Arc<dyn JobProducer>>,
}

impl QueueProducers {
    pub fn for_mode(&self, mode: ImportMode) -> Option<Arc<dyn JobProducer>> {
        match mode {
            ImportMode::Inline => None,
            ImportMode::Redis => self.redis.clone(),
            ImportMode::Amqp => self.amqp.clone(),
        }
    }
}

impl fmt::Debug for QueueProducers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueProducers")
            .field("redis", &self.redis.as_ref().map(|p| p.name()))
            .field("amqp", &self.amqp.as_ref().map(|p| p.name()))
            .finish()
    }
}

/// Processing strategy of one import run, fixed when the run starts
#[derive(Debug)]
pub enum Dispatcher {
    /// Resolve and enrich each record now
    Inline(EntryResolver),
    /// Hand each record to a queue backend
    Queue(Arc<dyn JobProducer>),
    /// The mode cannot dispatch; every record fails with the reason
    Unavailable(String),
}

impl Dispatcher {
    pub fn for_mode(
        mode: ImportMode,
        resolver: &EntryResolver,
        producers: &QueueProducers,
    ) -> ApplicationResult<Self> {
        if !mode.is_queued() {
            return Ok(Dispatcher::Inline(resolver.clone()));
        }
        producers
            .for_mode(mode)
            .map(Dispatcher::Queue)
            .ok_or(ApplicationError::ProducerNotConfigured(mode))
    }

    /// Process one record. Failures are reported as an outcome, never as an error.
    #[instrument(skip(self, record, options), level = "debug", fields(url = %record.url))]
    pub fn dispatch(
        &self,
        user_id: i32,
        source: ImportSource,
        record: &RawImportRecord,
        options: &ImportOptions,
    ) -> RecordOutcome {
        match self {
            Dispatcher::Inline(resolver) => match resolver.resolve(user_id, record, options) {
                Ok(resolution) => resolution.outcome(),
                Err(e) => {
                    warn!("Cannot import {}: {}", record.url, e);
                    RecordOutcome::Failed(e.to_string())
                }
            },
            Dispatcher::Queue(producer) => {
                let job = ImportJob::new(user_id, source, *options, record.clone());
                match producer.enqueue(&job) {
                    Ok(()) => {
                        debug!("Dispatched to {}", producer.name());
                        RecordOutcome::Queued
                    }
                    Err(e) => {
                        warn!("Cannot queue {} on {}: {}", record.url, producer.name(), e);
                        RecordOutcome::Failed(e.to_string())
                    }
                }
            }
            Dispatcher::Unavailable(reason) => RecordOutcome::Failed(reason.clone()),
        }
    }
}
