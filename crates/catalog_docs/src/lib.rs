//! Tabular report export: a format-neutral model plus XLSX and PDF renderers.

pub mod error;
pub mod export;
pub mod format;
pub mod model;
pub mod pdf;
pub mod xlsx;

pub use error::{ExportError, InvalidFormatError, ModelError, RenderError};
pub use export::{ExportedFile, ReportExporter};
pub use format::{DEFAULT_FORMAT_TOKEN, ExportFormat, OCTET_STREAM, supported_tokens};
pub use model::{Column, Row, Sheet, TabularModel, build_sheet, display_value};
