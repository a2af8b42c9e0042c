// src/domain/mod.rs
pub mod enrichment;
pub mod entry;
pub mod error;
pub mod import;
pub mod queue;
pub mod report;
pub mod repositories;
pub mod tag;
