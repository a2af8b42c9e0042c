pub mod di;
pub mod http;
pub mod json;
pub mod queue;
pub mod repositories;
