pub mod instapaper_import_repository;
pub mod sqlite;

use crate::domain::error::DomainResult;
use crate::domain::import::ImportSource;
use crate::domain::repositories::import_repository::ExportReader;
use instapaper_import_repository::InstapaperExport;

/// Parse an uploaded export file with the reader for its source
pub fn open_export(source: ImportSource, content: &[u8]) -> DomainResult<Box<dyn ExportReader>> {
    match source {
        ImportSource::Instapaper => Ok(Box::new(InstapaperExport::from_bytes(content)?)),
    }
}
