//! Supported export formats and token validation.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{InvalidFormatError, RenderError};
use crate::model::TabularModel;
use crate::{pdf, xlsx};

/// Token used when the caller does not ask for a format.
pub const DEFAULT_FORMAT_TOKEN: &str = "xlsx";

/// Generic binary content type for callers that do not advertise the
/// concrete report type.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Output kinds the export engine can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Spreadsheet workbook.
    Xlsx,
    /// Paginated PDF document.
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Xlsx, ExportFormat::Pdf];

    /// Check a caller-supplied token. Matching is exact and case-sensitive.
    pub fn validate(token: &str) -> Result<Self, InvalidFormatError> {
        Self::ALL
            .into_iter()
            .find(|format| format.token() == token)
            .ok_or_else(|| InvalidFormatError {
                format: token.to_string(),
                allowed: supported_tokens(),
            })
    }

    /// The request token, which is also the file extension.
    pub fn token(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Pdf => "pdf",
        }
    }

    /// File name suffix including the leading dot.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Xlsx => ".xlsx",
            Self::Pdf => ".pdf",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Pdf => "application/pdf",
        }
    }

    /// Render `model` to `path` with the renderer for this format.
    pub fn render(self, model: &TabularModel, path: &Path) -> Result<(), RenderError> {
        match self {
            Self::Xlsx => xlsx::render_workbook(model, path),
            Self::Pdf => pdf::render_document(model, path),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for ExportFormat {
    type Err = InvalidFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::validate(s)
    }
}

/// All accepted format tokens, in declaration order.
pub fn supported_tokens() -> Vec<&'static str> {
    ExportFormat::ALL.iter().map(|f| f.token()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_tokens_validate() {
        assert_eq!(ExportFormat::validate("xlsx").unwrap(), ExportFormat::Xlsx);
        assert_eq!(ExportFormat::validate("pdf").unwrap(), ExportFormat::Pdf);
        for token in supported_tokens() {
            assert!(ExportFormat::validate(token).is_ok(), "{token} rejected");
        }
    }

    #[test]
    fn test_unknown_tokens_rejected() {
        let bad = [
            "", "zzz", "XLSX", "Xlsx", "PDF", "Pdf", " xlsx", "pdf ", "xls", "csv", ".pdf",
        ];
        for token in bad {
            let err = ExportFormat::validate(token).unwrap_err();
            assert_eq!(err.format, token);
            assert_eq!(err.allowed, vec!["xlsx", "pdf"]);
        }
    }

    #[test]
    fn test_default_token_is_supported() {
        assert_eq!(
            ExportFormat::validate(DEFAULT_FORMAT_TOKEN).unwrap(),
            ExportFormat::Xlsx
        );
    }

    #[test]
    fn test_from_str_and_display() {
        let format: ExportFormat = "pdf".parse().unwrap();
        assert_eq!(format, ExportFormat::Pdf);
        assert_eq!(format.to_string(), "pdf");
        assert!("docx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_suffix_and_mime() {
        assert_eq!(ExportFormat::Xlsx.suffix(), ".xlsx");
        assert_eq!(ExportFormat::Pdf.suffix(), ".pdf");
        assert_eq!(ExportFormat::Pdf.mime_type(), "application/pdf");
        assert!(ExportFormat::Xlsx.mime_type().contains("spreadsheetml"));
    }
}
