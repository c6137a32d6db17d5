use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("File system error: {0}")]
    FileSystem(String),
}

/// Classification of errors for logging and user display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Error caused by the request (e.g., an unsupported report format).
    UserError,
    /// Internal system error (rendering, file I/O, etc.).
    SystemError,
    /// Invalid or missing configuration.
    ConfigError,
}

impl CatalogError {
    /// Returns the broad error category for routing and display purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::ConfigError,
            Self::InvalidInput(_) => ErrorCategory::UserError,
            Self::Export(_) => ErrorCategory::SystemError,
            Self::FileSystem(_) => ErrorCategory::SystemError,
        }
    }

    /// Returns a user-friendly message (hides internal details).
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(msg) => format!("Configuration issue: {msg}"),
            Self::InvalidInput(msg) => msg.clone(),
            Self::Export(_) => "The report could not be generated.".into(),
            Self::FileSystem(_) => "Storage error. Check disk space and permissions.".into(),
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem(err.to_string())
    }
}
