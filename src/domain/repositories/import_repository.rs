// src/domain/repositories/import_repository.rs
use crate::domain::error::DomainResult;
use crate::domain::import::{ImportSource, RawImportRecord};

/// A parsed export file.
///
/// `records` is lazy and restartable: every call iterates from the first data row.
/// Rows that cannot become a record are yielded as errors without ending the iteration.
pub trait ExportReader {
    fn source(&self) -> ImportSource;

    fn records(&self) -> Box<dyn Iterator<Item = DomainResult<RawImportRecord>> + '_>;
}
