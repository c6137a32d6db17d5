//! Report export error types.

use std::path::PathBuf;

use catalog_core::{CatalogError, ErrorCategory};

use crate::format::ExportFormat;

/// The requested output format is not one of the supported tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{format} format not allowed (supported: {})", .allowed.join(", "))]
pub struct InvalidFormatError {
    pub format: String,
    pub allowed: Vec<&'static str>,
}

/// A tabular model is structurally inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A model must contain at least one sheet.
    #[error("Model has no sheets")]
    NoSheets,

    /// Two sheets share the same name.
    #[error("Duplicate sheet name: {0}")]
    DuplicateSheet(String),

    /// A column key is declared twice within one sheet.
    #[error("Duplicate column '{column}' in sheet '{sheet}'")]
    DuplicateColumn { sheet: String, column: String },

    /// A row has no value for a declared column.
    #[error("Row {row} of sheet '{sheet}' has no value for column '{column}'")]
    MissingCell {
        sheet: String,
        row: usize,
        column: String,
    },

    /// A row carries a value for a column the sheet does not declare.
    #[error("Row {row} of sheet '{sheet}' references unknown column '{column}'")]
    UnknownColumn {
        sheet: String,
        row: usize,
        column: String,
    },
}

/// A renderer could not produce its output file.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Writing the destination failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The workbook library rejected the content.
    #[error("Workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    /// The model handed to the renderer is inconsistent.
    #[error("Inconsistent model: {0}")]
    Model(#[from] ModelError),

    /// The model exceeds what the output format can hold.
    #[error("Limit exceeded: {0}")]
    Limit(String),
}

/// The single failure type callers of the export engine deal with.
///
/// Renderer failures are flattened into a message so the concrete renderer
/// error types stay internal to this crate.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    InvalidFormat(#[from] InvalidFormatError),

    #[error("Could not build report: {0}")]
    Model(#[from] ModelError),

    #[error("Could not allocate report file in {}: {reason}", .dir.display())]
    Allocation { dir: PathBuf, reason: String },

    #[error("Could not render {format} report: {reason}")]
    Render { format: ExportFormat, reason: String },
}

impl ExportError {
    /// Broad category used by outer layers to choose a response.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidFormat(_) => ErrorCategory::UserError,
            Self::Model(_) | Self::Allocation { .. } | Self::Render { .. } => {
                ErrorCategory::SystemError
            }
        }
    }

    /// True when the failure was caused by the request itself.
    pub fn is_client_error(&self) -> bool {
        self.category() == ErrorCategory::UserError
    }
}

impl From<ExportError> for CatalogError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::InvalidFormat(e) => CatalogError::InvalidInput(e.to_string()),
            ExportError::Allocation { .. } => CatalogError::FileSystem(err.to_string()),
            ExportError::Model(_) | ExportError::Render { .. } => {
                CatalogError::Export(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_format_message_lists_allowed() {
        let err = InvalidFormatError {
            format: "zzz".into(),
            allowed: vec!["xlsx", "pdf"],
        };
        assert_eq!(
            err.to_string(),
            "zzz format not allowed (supported: xlsx, pdf)"
        );
    }

    #[test]
    fn test_export_error_categories() {
        let invalid = ExportError::from(InvalidFormatError {
            format: "doc".into(),
            allowed: vec!["xlsx", "pdf"],
        });
        assert!(invalid.is_client_error());
        assert_eq!(invalid.category(), ErrorCategory::UserError);

        let render = ExportError::Render {
            format: ExportFormat::Pdf,
            reason: "disk full".into(),
        };
        assert!(!render.is_client_error());
        assert_eq!(render.category(), ErrorCategory::SystemError);
    }

    #[test]
    fn test_render_error_wraps_model_error() {
        let err = RenderError::from(ModelError::NoSheets);
        assert!(err.to_string().contains("no sheets"));
    }

    #[test]
    fn test_into_catalog_error() {
        let invalid: CatalogError = ExportError::from(InvalidFormatError {
            format: "csv".into(),
            allowed: vec!["xlsx", "pdf"],
        })
        .into();
        assert!(matches!(invalid, CatalogError::InvalidInput(_)));
        assert_eq!(invalid.category(), ErrorCategory::UserError);

        let alloc: CatalogError = ExportError::Allocation {
            dir: PathBuf::from("/nope"),
            reason: "missing".into(),
        }
        .into();
        assert!(matches!(alloc, CatalogError::FileSystem(_)));

        let render: CatalogError = ExportError::Render {
            format: ExportFormat::Xlsx,
            reason: "boom".into(),
        }
        .into();
        assert!(matches!(render, CatalogError::Export(_)));
    }
}
