//! Product report: column layout and the export entry point.

use catalog_core::{CatalogConfig, CatalogError};
use catalog_docs::{
    Column, ExportError, ExportFormat, ExportedFile, ModelError, ReportExporter, TabularModel,
};
use tracing::info;

use crate::product::ProductResponse;

pub const SHEET_PRODUCT: &str = "PRODUCT";
pub const REPORT_NAME_PRODUCT: &str = "product_report";

pub const COL_PRODUCT_ID: &str = "ID";
pub const COL_PRODUCT_NAME: &str = "NAME";
pub const COL_PRODUCT_PRICE: &str = "PRICE";
pub const COL_PRODUCT_DESCRIPTION: &str = "DESCRIPTION";
pub const COL_CATEGORY_ID: &str = "CATEGORY_ID";
pub const COL_CATEGORY_NAME: &str = "CATEGORY_NAME";

/// Product report columns, in report order.
pub fn product_columns() -> Vec<Column<'static, ProductResponse>> {
    vec![
        Column::new(COL_PRODUCT_ID, |p: &ProductResponse| p.id),
        Column::new(COL_PRODUCT_NAME, |p: &ProductResponse| p.name.clone()),
        Column::new(COL_PRODUCT_PRICE, |p: &ProductResponse| p.price),
        Column::new(COL_PRODUCT_DESCRIPTION, |p: &ProductResponse| {
            p.description.clone()
        }),
        Column::new(COL_CATEGORY_ID, ProductResponse::category_id),
        Column::new(COL_CATEGORY_NAME, |p: &ProductResponse| {
            p.category_name().map(str::to_owned)
        }),
    ]
}

/// Flatten a page of products into the single-sheet product model.
pub fn build_product_model(rows: &[ProductResponse]) -> Result<TabularModel, ModelError> {
    TabularModel::build(SHEET_PRODUCT, &product_columns(), rows)
}

/// Exports pages of products as spreadsheet or PDF reports.
#[derive(Debug, Clone)]
pub struct ProductReportService {
    exporter: ReportExporter,
    report_name: String,
    default_format: ExportFormat,
}

impl ProductReportService {
    pub fn new(exporter: ReportExporter) -> Self {
        Self {
            exporter,
            report_name: REPORT_NAME_PRODUCT.to_string(),
            default_format: ExportFormat::Xlsx,
        }
    }

    /// Build the service from configuration. An unsupported default format
    /// is rejected here rather than on the first request.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let default_format = ExportFormat::validate(&config.default_export_format)
            .map_err(|e| CatalogError::Config(format!("default_export_format: {e}")))?;
        Ok(Self {
            exporter: ReportExporter::new(config.resolved_export_dir()),
            report_name: config.product_report_name.clone(),
            default_format,
        })
    }

    pub fn report_name(&self) -> &str {
        &self.report_name
    }

    pub fn default_format(&self) -> ExportFormat {
        self.default_format
    }

    /// Export `rows` in the format named by `format`.
    ///
    /// The token is validated before the model is built or any file is
    /// created. The returned file belongs to the caller and is deleted when
    /// dropped.
    pub fn export_data_excel(
        &self,
        rows: &[ProductResponse],
        format: &str,
    ) -> Result<ExportedFile, ExportError> {
        let format = ExportFormat::validate(format)?;
        self.export_as(rows, format)
    }

    /// Like [`Self::export_data_excel`], falling back to the default format
    /// when none is requested.
    pub fn export_data(
        &self,
        rows: &[ProductResponse],
        format: Option<&str>,
    ) -> Result<ExportedFile, ExportError> {
        match format {
            Some(token) => self.export_data_excel(rows, token),
            None => self.export_as(rows, self.default_format),
        }
    }

    fn export_as(
        &self,
        rows: &[ProductResponse],
        format: ExportFormat,
    ) -> Result<ExportedFile, ExportError> {
        let model = build_product_model(rows)?;
        let file = self.exporter.export(&model, format, &self.report_name)?;
        info!(
            products = rows.len(),
            format = %format,
            file = file.file_name(),
            "Product report ready"
        );
        Ok(file)
    }
}
