// src/domain/import.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::tag::Tag;

/// Normalize a URL for matching: trimmed, absolute http(s), canonical serialization.
pub fn normalize_url(raw: &str) -> DomainResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidUrl("URL is empty".to_string()));
    }

    let parsed =
        Url::parse(trimmed).map_err(|e| DomainError::InvalidUrl(format!("{}: {}", trimmed, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed.to_string()),
        scheme => Err(DomainError::InvalidUrl(format!(
            "{}: unsupported scheme '{}'",
            trimmed, scheme
        ))),
    }
}

/// Third-party export formats the pipeline understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportSource {
    Instapaper,
}

impl ImportSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportSource::Instapaper => "instapaper",
        }
    }

    /// Queue that carries deferred jobs for this source, e.g. `import.instapaper`
    pub fn queue_name(&self, prefix: &str) -> String {
        let prefix = prefix.trim_end_matches('.');
        if prefix.is_empty() {
            self.as_str().to_string()
        } else {
            format!("{}.{}", prefix, self.as_str())
        }
    }
}

impl fmt::Display for ImportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportSource {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "instapaper" => Ok(ImportSource::Instapaper),
            other => Err(DomainError::Other(format!("Unknown import source: {}", other))),
        }
    }
}

/// How records of one import run are processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Resolve and enrich every record during the request
    #[default]
    Inline,
    /// Push one job per record onto a Redis list
    Redis,
    /// Publish one job per record to an AMQP queue
    Amqp,
}

impl ImportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportMode::Inline => "inline",
            ImportMode::Redis => "redis",
            ImportMode::Amqp => "amqp",
        }
    }

    pub fn is_queued(&self) -> bool {
        !matches!(self, ImportMode::Inline)
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inline" | "sync" => Ok(ImportMode::Inline),
            "redis" => Ok(ImportMode::Redis),
            "amqp" | "rabbitmq" => Ok(ImportMode::Amqp),
            other => Err(DomainError::Other(format!(
                "Unknown import mode '{}', expected one of: inline, redis, amqp",
                other
            ))),
        }
    }
}

/// Per-run switches chosen by the user at upload time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Archive every created or matched entry
    #[serde(default)]
    pub mark_as_read: bool,
    /// Skip fetching the article, keep only what the export provides
    #[serde(default)]
    pub disable_content_update: bool,
}

/// One bookmark as read from an export file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawImportRecord {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub tags: HashSet<Tag>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub is_starred: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl RawImportRecord {
    /// Create a record with a normalized URL and no tags
    pub fn new<S: AsRef<str>>(url: S, title: S) -> DomainResult<Self> {
        Ok(Self {
            url: normalize_url(url.as_ref())?,
            title: title.as_ref().trim().to_string(),
            tags: HashSet::new(),
            is_read: false,
            is_starred: false,
            created_at: None,
        })
    }

    pub fn with_tags(mut self, tags: HashSet<Tag>) -> Self {
        self.tags = tags;
        self
    }

    pub fn read(mut self, is_read: bool) -> Self {
        self.is_read = is_read;
        self
    }

    pub fn starred(mut self, is_starred: bool) -> Self {
        self.is_starred = is_starred;
        self
    }

    pub fn created_at(mut self, created_at: Option<DateTime<Utc>>) -> Self {
        self.created_at = created_at;
        self
    }
}

/// Deferred unit of work: one record for one user, processed by a queue consumer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportJob {
    pub user_id: i32,
    pub source: ImportSource,
    #[serde(default)]
    pub options: ImportOptions,
    pub record: RawImportRecord,
}

impl ImportJob {
    pub fn new(
        user_id: i32,
        source: ImportSource,
        options: ImportOptions,
        record: RawImportRecord,
    ) -> Self {
        Self {
            user_id,
            source,
            options,
            record,
        }
    }

    pub fn to_payload(&self) -> DomainResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a queued payload. The URL is normalized again since the payload crossed a process boundary.
    pub fn from_payload(payload: &[u8]) -> DomainResult<Self> {
        let mut job: ImportJob = serde_json::from_slice(payload)?;
        if job.user_id <= 0 {
            return Err(DomainError::Serialization(format!(
                "Invalid user id in job: {}",
                job.user_id
            )));
        }
        job.record.url = normalize_url(&job.record.url)?;
        Ok(job)
    }
}
