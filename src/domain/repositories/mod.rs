pub mod config_store;
pub mod import_repository;
pub mod repository;
