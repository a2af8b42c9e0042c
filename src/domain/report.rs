// src/domain/report.rs
use crate::domain::import::{ImportMode, ImportSource};
use std::fmt;
use tracing::debug;

/// What happened to one record of an import run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A new entry was created inline
    Imported,
    /// An entry for the URL already existed; tags were merged
    Merged,
    /// The record was handed to a queue backend
    Queued,
    Failed(String),
}

/// Why an import run produced no summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// No file content was supplied at all
    MissingFile,
    /// The content is not an export of the expected format
    MalformedFormat(String),
    /// The file parsed but held no usable record
    EmptyFile,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::MissingFile => write!(f, "no file was uploaded"),
            FailureReason::MalformedFormat(msg) => write!(f, "malformed file: {}", msg),
            FailureReason::EmptyFile => write!(f, "no entries found in file"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub source: ImportSource,
    pub mode: ImportMode,
    pub imported: usize,
    pub skipped: usize,
    pub failed: usize,
    pub queued: usize,
}

/// Final result of an import run, mapped by the caller to a user notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportReport {
    Summary(ImportSummary),
    Failed(FailureReason),
}

impl ImportReport {
    pub fn is_success(&self) -> bool {
        matches!(self, ImportReport::Summary(_))
    }

    /// Message key for the notice shown to the user
    pub fn notice_key(&self) -> &'static str {
        match self {
            ImportReport::Summary(s) if s.queued > 0 => "import.notice.summary_with_queue",
            ImportReport::Summary(_) => "import.notice.summary",
            ImportReport::Failed(FailureReason::MissingFile) => "import.notice.failed_on_file",
            ImportReport::Failed(_) => "import.notice.failed",
        }
    }

    pub fn summary(&self) -> Option<&ImportSummary> {
        match self {
            ImportReport::Summary(s) => Some(s),
            ImportReport::Failed(_) => None,
        }
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportReport::Summary(s) if s.queued > 0 => write!(
                f,
                "Import from {} summary: {} queued, {} skipped, {} failed",
                s.source, s.queued, s.skipped, s.failed
            ),
            ImportReport::Summary(s) => write!(
                f,
                "Import from {} summary: {} imported, {} already saved, {} failed",
                s.source, s.imported, s.skipped, s.failed
            ),
            ImportReport::Failed(reason) => write!(f, "Import failed: {}", reason),
        }
    }
}

/// Counters of one upload, finalized into an `ImportReport`
#[derive(Debug, Clone)]
pub struct ImportSession {
    source: ImportSource,
    mode: ImportMode,
    parsed: usize,
    imported: usize,
    skipped: usize,
    failed: usize,
    queued: usize,
}

impl ImportSession {
    pub fn new(source: ImportSource, mode: ImportMode) -> Self {
        Self {
            source,
            mode,
            parsed: 0,
            imported: 0,
            skipped: 0,
            failed: 0,
            queued: 0,
        }
    }

    pub fn mode(&self) -> ImportMode {
        self.mode
    }

    /// Count the outcome of a successfully parsed record.
    /// Queued records count as imported: dispatch is the unit of success for queue modes.
    pub fn record(&mut self, outcome: &RecordOutcome) {
        self.parsed += 1;
        match outcome {
            RecordOutcome::Imported => self.imported += 1,
            RecordOutcome::Merged => self.skipped += 1,
            RecordOutcome::Queued => {
                self.imported += 1;
                self.queued += 1;
            }
            RecordOutcome::Failed(reason) => {
                debug!("Record failed: {}", reason);
                self.failed += 1;
            }
        }
    }

    /// Count a row that could not be turned into a record
    pub fn record_unparsable(&mut self) {
        self.failed += 1;
    }

    pub fn finish(self) -> ImportReport {
        if self.parsed == 0 {
            return ImportReport::Failed(FailureReason::EmptyFile);
        }
        ImportReport::Summary(ImportSummary {
            source: self.source,
            mode: self.mode,
            imported: self.imported,
            skipped: self.skipped,
            failed: self.failed,
            queued: self.queued,
        })
    }
}
