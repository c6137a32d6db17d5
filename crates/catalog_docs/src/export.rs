//! Report export orchestration and the exported-file handle.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::{debug, info, warn};

use crate::error::ExportError;
use crate::format::ExportFormat;
use crate::model::TabularModel;

/// Renders tabular models into uniquely named files inside one directory.
///
/// Holds no state besides the directory, so one exporter can serve any
/// number of concurrent requests. File name uniqueness comes from
/// `tempfile`, not from locking.
#[derive(Debug, Clone)]
pub struct ReportExporter {
    output_dir: PathBuf,
}

impl Default for ReportExporter {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl ReportExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Validate `token`, then export. An invalid token fails before any
    /// file is created.
    pub fn export_token(
        &self,
        model: &TabularModel,
        token: &str,
        report_name: &str,
    ) -> Result<ExportedFile, ExportError> {
        let format = ExportFormat::validate(token)?;
        self.export(model, format, report_name)
    }

    /// Render `model` as `format` into a fresh file named after `report_name`.
    ///
    /// If rendering fails the partial file is removed before the error is
    /// returned.
    pub fn export(
        &self,
        model: &TabularModel,
        format: ExportFormat,
        report_name: &str,
    ) -> Result<ExportedFile, ExportError> {
        let path = self.allocate(format, report_name)?;
        debug!("Allocated {} for {format} report '{report_name}'", path.display());

        if let Err(e) = format.render(model, &path) {
            warn!("Failed to render {format} report '{report_name}': {e}");
            let partial = path.display().to_string();
            if let Err(cleanup) = path.close() {
                warn!("Failed to remove partial report {partial}: {cleanup}");
            }
            return Err(ExportError::Render {
                format,
                reason: e.to_string(),
            });
        }

        info!(
            "Exported {format} report '{report_name}' to {}",
            path.display()
        );
        Ok(ExportedFile {
            path,
            report_name: report_name.to_string(),
            format,
        })
    }

    fn allocate(&self, format: ExportFormat, report_name: &str) -> Result<TempPath, ExportError> {
        tempfile::Builder::new()
            .prefix(&temp_prefix(report_name))
            .suffix(format.suffix())
            .tempfile_in(&self.output_dir)
            .map(|file| file.into_temp_path())
            .map_err(|e| ExportError::Allocation {
                dir: self.output_dir.clone(),
                reason: e.to_string(),
            })
    }
}

/// Longest prefix taken from the report name.
const MAX_PREFIX_LEN: usize = 64;

/// File name prefix derived from the report name: anything other than
/// ASCII alphanumerics, `-` and `_` becomes `_`, cut to
/// [`MAX_PREFIX_LEN`] characters.
fn temp_prefix(report_name: &str) -> String {
    let mut prefix: String = report_name
        .chars()
        .take(MAX_PREFIX_LEN)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if prefix.is_empty() {
        prefix.push_str("report");
    }
    prefix.push('_');
    prefix
}

/// A generated report file owned by the caller.
///
/// The file is deleted when the handle is dropped, so it cannot leak on
/// error paths. Use [`ExportedFile::stream_to`] to send it somewhere and
/// delete it, or [`ExportedFile::keep`] / [`ExportedFile::persist`] to
/// retain it.
#[derive(Debug)]
pub struct ExportedFile {
    path: TempPath,
    report_name: String,
    format: ExportFormat,
}

impl ExportedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the generated file on disk.
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }

    pub fn report_name(&self) -> &str {
        &self.report_name
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn size(&self) -> io::Result<u64> {
        Ok(std::fs::metadata(&*self.path)?.len())
    }

    pub fn content_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Download name: `<report name>.<extension>`.
    pub fn attachment_name(&self) -> String {
        format!("{}{}", self.report_name, self.format.suffix())
    }

    /// Copy the file into `writer`, then delete it. The file is deleted on
    /// failure too.
    pub fn stream_to<W: Write>(self, writer: &mut W) -> io::Result<u64> {
        let copied = {
            let mut file = File::open(&*self.path)?;
            io::copy(&mut file, writer)?
        };
        writer.flush()?;
        self.close()?;
        Ok(copied)
    }

    /// Delete the file now, reporting any error.
    pub fn close(self) -> io::Result<()> {
        debug!("Removing report file {}", self.path.display());
        self.path.close()
    }

    /// Stop managing the file and return its path. The caller becomes
    /// responsible for deleting it.
    pub fn keep(self) -> io::Result<PathBuf> {
        self.path.keep().map_err(|e| e.error)
    }

    /// Move the file to `destination` and stop managing it.
    pub fn persist(self, destination: impl AsRef<Path>) -> io::Result<()> {
        self.path.persist(destination).map_err(|e| e.error)
    }
}
