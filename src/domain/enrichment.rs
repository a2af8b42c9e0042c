// src/domain/enrichment.rs
use std::fmt::Debug;

/// Metadata derived from fetching an article
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    pub title: Option<String>,
    pub mimetype: Option<String>,
    pub preview_picture: Option<String>,
    pub language: Option<String>,
}

impl EntryMetadata {
    fn is_complete(&self) -> bool {
        self.mimetype.is_some() && self.preview_picture.is_some() && self.language.is_some()
    }

    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.mimetype.is_none()
            && self.preview_picture.is_none()
            && self.language.is_none()
    }
}

/// Result of one best-effort enrichment attempt.
///
/// Enrichment never aborts a record: `Failed` carries the reason for logging
/// and yields empty metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    Complete(EntryMetadata),
    Partial(EntryMetadata),
    Failed(String),
    Skipped,
}

impl EnrichmentOutcome {
    /// Classify fetched metadata by how much of it could be derived
    pub fn from_metadata(metadata: EntryMetadata) -> Self {
        if metadata.is_complete() {
            EnrichmentOutcome::Complete(metadata)
        } else if metadata.is_empty() {
            EnrichmentOutcome::Failed("no metadata could be derived".to_string())
        } else {
            EnrichmentOutcome::Partial(metadata)
        }
    }

    pub fn into_metadata(self) -> EntryMetadata {
        match self {
            EnrichmentOutcome::Complete(m) | EnrichmentOutcome::Partial(m) => m,
            EnrichmentOutcome::Failed(_) | EnrichmentOutcome::Skipped => EntryMetadata::default(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EnrichmentOutcome::Complete(_) => "complete",
            EnrichmentOutcome::Partial(_) => "partial",
            EnrichmentOutcome::Failed(_) => "failed",
            EnrichmentOutcome::Skipped => "skipped",
        }
    }
}

/// Fetches an article and derives its metadata
pub trait ContentFetcher: Send + Sync + Debug {
    fn fetch(&self, url: &str) -> EnrichmentOutcome;
}

/// Fetcher that never touches the network
#[derive(Debug, Clone, Default)]
pub struct NoopFetcher;

impl ContentFetcher for NoopFetcher {
    fn fetch(&self, _url: &str) -> EnrichmentOutcome {
        EnrichmentOutcome::Skipped
    }
}
