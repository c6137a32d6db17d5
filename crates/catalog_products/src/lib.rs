//! Product catalog DTOs and the product report export service.

pub mod product;
pub mod report;

pub use product::{CategoryResponse, ProductResponse, parse_products};
pub use report::{
    COL_CATEGORY_ID, COL_CATEGORY_NAME, COL_PRODUCT_DESCRIPTION, COL_PRODUCT_ID,
    COL_PRODUCT_NAME, COL_PRODUCT_PRICE, ProductReportService, REPORT_NAME_PRODUCT, SHEET_PRODUCT,
    build_product_model, product_columns,
};
