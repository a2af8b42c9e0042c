// src/application/services/mod.rs
pub mod dispatch;
pub mod entry_resolver;
pub mod import_service;
