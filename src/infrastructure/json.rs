// src/infrastructure/json.rs

use crate::domain::entry::Entry;
use crate::domain::error::{DomainError, DomainResult};
use serde::Serialize;
use std::io::Write;

/// Structure for serializing entries to JSON output
#[derive(Serialize, Debug, PartialEq)]
pub struct JsonEntryView {
    pub id: Option<i32>,
    pub url: String,
    pub title: String,
    pub mimetype: Option<String>,
    pub preview_picture: Option<String>,
    pub language: Option<String>,
    pub tags: Vec<String>,
    pub is_archived: bool,
    pub is_starred: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl JsonEntryView {
    pub fn from_domain(entry: &Entry) -> Self {
        let mut tags: Vec<String> = entry.tags.iter().map(|t| t.value().to_string()).collect();
        tags.sort();
        Self {
            id: entry.id,
            url: entry.url.clone(),
            title: entry.title.clone(),
            mimetype: entry.mimetype.clone(),
            preview_picture: entry.preview_picture.clone(),
            language: entry.language.clone(),
            tags,
            is_archived: entry.is_archived,
            is_starred: entry.is_starred,
            created_at: entry.created_at.to_rfc3339(),
            updated_at: entry.updated_at.to_rfc3339(),
        }
    }

    pub fn from_domain_collection(entries: &[Entry]) -> Vec<Self> {
        entries.iter().map(Self::from_domain).collect()
    }
}

/// Writes entries as JSON to standard output, without colors or formatting
pub fn write_entries_as_json(views: &[JsonEntryView]) -> DomainResult<()> {
    let json = serde_json::to_string_pretty(&views)?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", json)
        .and_then(|_| stdout.flush())
        .map_err(|e| DomainError::Other(format!("Failed to write JSON to stdout: {}", e)))?;

    Ok(())
}
