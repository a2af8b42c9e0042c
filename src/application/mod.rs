// src/application/mod.rs
pub mod error;
pub mod services;

pub use services::import_service::{ImportRequest, ImportService, ImportServiceImpl};
