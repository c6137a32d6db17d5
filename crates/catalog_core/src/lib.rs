pub mod config;
pub mod error_handler;
pub mod logging;

pub use config::CatalogConfig;
pub use error_handler::{CatalogError, ErrorCategory};
