// src/infrastructure/repositories/instapaper_import_repository.rs

use chrono::{DateTime, Utc};
use csv::StringRecord;
use std::collections::HashSet;
use tracing::{debug, instrument, trace, warn};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::import::{ImportSource, RawImportRecord};
use crate::domain::repositories::import_repository::ExportReader;
use crate::domain::tag::Tag;

/// Positions of the known Instapaper columns in the header row
#[derive(Debug, Clone, Copy)]
struct Columns {
    url: usize,
    title: Option<usize>,
    folder: Option<usize>,
    timestamp: Option<usize>,
    tags: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> DomainResult<Self> {
        let url = find_column(headers, "url")
            .ok_or_else(|| DomainError::MalformedFormat("No URL column found in CSV".into()))?;

        // "Selection" is part of the export but carries nothing we keep
        Ok(Self {
            url,
            title: find_column(headers, "title"),
            folder: find_column(headers, "folder"),
            timestamp: find_column(headers, "timestamp"),
            tags: find_column(headers, "tags"),
        })
    }
}

/// Instapaper CSV export held in memory.
///
/// The header is validated once on construction; rows are decoded lazily on
/// every call to `records`.
#[derive(Debug, Clone)]
pub struct InstapaperExport {
    content: String,
    columns: Option<Columns>,
}

impl InstapaperExport {
    #[instrument(skip_all, level = "debug", fields(size = content.len()))]
    pub fn from_bytes(content: &[u8]) -> DomainResult<Self> {
        let content = std::str::from_utf8(content)
            .map_err(|e| DomainError::MalformedFormat(format!("File is not UTF-8: {}", e)))?
            .to_string();

        if content.trim().is_empty() {
            debug!("Empty export file");
            return Ok(Self {
                content,
                columns: None,
            });
        }

        let mut reader = Self::reader(&content);
        let headers = reader
            .headers()
            .map_err(|e| DomainError::MalformedFormat(e.to_string()))?
            .clone();
        let columns = Columns::from_headers(&headers)?;
        debug!(column_count = headers.len(), ?columns, "CSV headers parsed");

        Ok(Self {
            content,
            columns: Some(columns),
        })
    }

    fn reader(content: &str) -> csv::Reader<&[u8]> {
        csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes())
    }
}

impl ExportReader for InstapaperExport {
    fn source(&self) -> ImportSource {
        ImportSource::Instapaper
    }

    fn records(&self) -> Box<dyn Iterator<Item = DomainResult<RawImportRecord>> + '_> {
        let Some(columns) = self.columns else {
            return Box::new(std::iter::empty());
        };

        let rows = Self::reader(&self.content).into_records();
        Box::new(rows.enumerate().map(move |(idx, row)| {
            // Header is line 1; quoted fields may span lines, so prefer the reader's position
            let fallback_line = idx + 2;
            match row {
                Ok(row) => {
                    let line = row
                        .position()
                        .map(|p| p.line() as usize)
                        .unwrap_or(fallback_line);
                    parse_row(&row, &columns)
                        .map_err(|reason| DomainError::InvalidRecord { line, reason })
                }
                Err(e) => Err(DomainError::InvalidRecord {
                    line: e
                        .position()
                        .map(|p| p.line() as usize)
                        .unwrap_or(fallback_line),
                    reason: e.to_string(),
                }),
            }
        }))
    }
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
}

fn get_optional_field<'r>(record: &'r StringRecord, col: Option<usize>) -> Option<&'r str> {
    col.and_then(|c| record.get(c))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn parse_row(row: &StringRecord, columns: &Columns) -> Result<RawImportRecord, String> {
    let url = row.get(columns.url).unwrap_or("").trim();
    if url.is_empty() {
        return Err("Missing URL".to_string());
    }
    let title = get_optional_field(row, columns.title).unwrap_or("");

    let mut record = RawImportRecord::new(url, title).map_err(|e| e.to_string())?;

    let mut tags = get_optional_field(row, columns.tags)
        .map(parse_tags_field)
        .unwrap_or_default();

    match get_optional_field(row, columns.folder) {
        Some(folder) if folder.eq_ignore_ascii_case("archive") => {
            record = record.read(true);
        }
        Some(folder) if folder.eq_ignore_ascii_case("starred") => {
            record = record.read(true).starred(true);
        }
        Some(folder) if folder.eq_ignore_ascii_case("unread") => {}
        Some(folder) => match Tag::new(folder) {
            Ok(tag) => {
                tags.insert(tag);
            }
            Err(e) => warn!("Skipping folder tag '{}': {}", folder, e),
        },
        None => {}
    }

    let created_at = get_optional_field(row, columns.timestamp)
        .map(parse_timestamp)
        .transpose()?;

    trace!(url = %record.url, tag_count = tags.len(), "Parsed row");
    Ok(record.with_tags(tags).created_at(created_at))
}

/// Accepts a JSON array of names or a comma separated list
fn parse_tags_field(raw: &str) -> HashSet<Tag> {
    let names: Vec<String> = match serde_json::from_str::<Vec<String>>(raw) {
        Ok(names) => names,
        Err(_) => raw.split(',').map(str::to_string).collect(),
    };

    names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .filter_map(|name| match Tag::new(name) {
            Ok(tag) => Some(tag),
            Err(e) => {
                warn!("Skipping tag '{}': {}", name, e);
                None
            }
        })
        .collect()
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let secs: i64 = raw
        .parse()
        .map_err(|_| format!("Invalid timestamp '{}'", raw))?;
    DateTime::<Utc>::from_timestamp(secs, 0).ok_or_else(|| format!("Timestamp out of range '{}'", raw))
}
