use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};
use tracing::debug;

use crate::error::RenderError;
use crate::model::{Sheet, TabularModel};

/// Highest column count a worksheet can hold.
const MAX_COLUMNS: usize = 16_384;

/// Highest row count a worksheet can hold, header included.
const MAX_ROWS: usize = 1_048_576;

/// Render the model as an XLSX workbook at `path`.
pub fn render_workbook(model: &TabularModel, path: &Path) -> Result<(), RenderError> {
    let mut workbook = build_workbook(model)?;
    workbook.save(path)?;
    debug!("Wrote workbook to {}", path.display());
    Ok(())
}

/// Render the model as XLSX bytes.
pub fn generate_workbook(model: &TabularModel) -> Result<Vec<u8>, RenderError> {
    let mut workbook = build_workbook(model)?;
    Ok(workbook.save_to_buffer()?)
}

fn build_workbook(model: &TabularModel) -> Result<Workbook, RenderError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let text_format = Format::new().set_num_format("@");

    for sheet in model.sheets() {
        write_sheet(&mut workbook, sheet, &header_format, &text_format)?;
    }

    Ok(workbook)
}

/// Write one worksheet: bold header row, then one string row per table row.
fn write_sheet(
    workbook: &mut Workbook,
    sheet: &Sheet,
    header_format: &Format,
    text_format: &Format,
) -> Result<(), RenderError> {
    let rows = sheet.ordered_rows()?;

    if sheet.columns().len() > MAX_COLUMNS {
        return Err(RenderError::Limit(format!(
            "sheet '{}' has {} columns, max {MAX_COLUMNS}",
            sheet.name(),
            sheet.columns().len()
        )));
    }
    if rows.len() + 1 > MAX_ROWS {
        return Err(RenderError::Limit(format!(
            "sheet '{}' has {} rows, max {}",
            sheet.name(),
            rows.len(),
            MAX_ROWS - 1
        )));
    }

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet.name())?;

    for (col, header) in sheet.columns().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, header_format)?;
    }

    // Every cell is a string cell, "9.99" stays "9.99". Empty strings are
    // dropped by write_string, so they go out as text-formatted blanks and
    // the row is still emitted.
    for (row_idx, cells) in rows.iter().enumerate() {
        let excel_row = (row_idx + 1) as u32;
        for (col_idx, cell) in cells.iter().enumerate() {
            let col = col_idx as u16;
            if cell.is_empty() {
                worksheet.write_blank(excel_row, col, text_format)?;
            } else {
                worksheet.write_string(excel_row, col, *cell)?;
            }
        }
    }

    worksheet.autofit();

    debug!(sheet = sheet.name(), rows = rows.len(), "Wrote worksheet");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::model::{Column, Row, build_sheet};
    use calamine::{Data, Reader, Xlsx, open_workbook};

    struct Product {
        id: i64,
        name: Option<&'static str>,
        price: Option<f64>,
    }

    fn columns() -> Vec<Column<'static, Product>> {
        vec![
            Column::new("ID", |p: &Product| Some(p.id)),
            Column::new("NAME", |p: &Product| p.name),
            Column::new("PRICE", |p: &Product| p.price),
        ]
    }

    fn sample_model() -> TabularModel {
        let rows = vec![
            Product {
                id: 1,
                name: Some("Widget"),
                price: Some(9.99),
            },
            Product {
                id: 2,
                name: None,
                price: Some(19.5),
            },
        ];
        TabularModel::build("PRODUCT", &columns(), &rows).unwrap()
    }

    fn cell_text(cell: &Data) -> String {
        match cell {
            Data::Empty => String::new(),
            Data::String(s) => s.clone(),
            other => panic!("expected a string cell, got {other:?}"),
        }
    }

    /// Read every worksheet back as (name, rows-of-strings).
    fn read_back(path: &Path) -> Vec<(String, Vec<Vec<String>>)> {
        let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
        let names = workbook.sheet_names().to_vec();
        names
            .into_iter()
            .map(|name| {
                let range = workbook.worksheet_range(&name).unwrap();
                let rows = range
                    .rows()
                    .map(|row| row.iter().map(cell_text).collect())
                    .collect();
                (name, rows)
            })
            .collect()
    }

    #[test]
    fn test_generate_workbook_is_zip() {
        let bytes = generate_workbook(&sample_model()).unwrap();
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn test_render_workbook_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("report.xlsx");
        render_workbook(&sample_model(), &path).unwrap();

        let sheets = read_back(&path);
        assert_eq!(sheets.len(), 1);
        let (name, rows) = &sheets[0];
        assert_eq!(name, "PRODUCT");
        assert_eq!(rows[0], vec!["ID", "NAME", "PRICE"]);
        assert_eq!(rows[1], vec!["1", "Widget", "9.99"]);
        assert_eq!(rows[2], vec!["2", "", "19.5"]);
    }

    #[test]
    fn test_numeric_strings_stay_text() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("numbers.xlsx");
        render_workbook(&sample_model(), &path).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range("PRODUCT").unwrap();
        assert_eq!(range.get((1, 2)), Some(&Data::String("9.99".into())));
        assert_eq!(range.get((1, 0)), Some(&Data::String("1".into())));
    }

    #[test]
    fn test_empty_rows_writes_header_only() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("empty.xlsx");
        let empty: Vec<Product> = Vec::new();
        let model = TabularModel::build("PRODUCT", &columns(), &empty).unwrap();
        render_workbook(&model, &path).unwrap();

        let sheets = read_back(&path);
        assert_eq!(sheets[0].1, vec![vec!["ID", "NAME", "PRICE"]]);
    }

    #[test]
    fn test_multi_sheet_workbook() {
        let a = [Product {
            id: 1,
            name: Some("a"),
            price: None,
        }];
        let b = [Product {
            id: 2,
            name: Some("b"),
            price: None,
        }];
        let first = build_sheet("FIRST", &columns(), &a).unwrap();
        let second = build_sheet("SECOND", &columns(), &b).unwrap();
        let model = TabularModel::new(vec![first, second]).unwrap();

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("multi.xlsx");
        render_workbook(&model, &path).unwrap();

        let sheets = read_back(&path);
        let names: Vec<&str> = sheets.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["FIRST", "SECOND"]);
        assert_eq!(sheets[1].1[1], vec!["2", "b", ""]);
    }

    #[test]
    fn test_special_characters_preserved() {
        let mut row = Row::new();
        row.insert("DATA".into(), "Hello, \"World\" & <tags>".into());
        let sheet = Sheet::from_rows("S", vec!["DATA".into()], vec![row]).unwrap();
        let model = TabularModel::new(vec![sheet]).unwrap();

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("special.xlsx");
        render_workbook(&model, &path).unwrap();
        assert_eq!(read_back(&path)[0].1[1], vec!["Hello, \"World\" & <tags>"]);
    }

    #[test]
    fn test_inconsistent_row_is_rejected() {
        let mut row = Row::new();
        row.insert("A".into(), "1".into());
        let sheet = Sheet::from_rows("S", vec!["A".into(), "B".into()], vec![row]).unwrap();
        let model = TabularModel::new(vec![sheet]).unwrap();

        let err = generate_workbook(&model).unwrap_err();
        assert!(matches!(err, RenderError::Model(ModelError::MissingCell { .. })));
    }

    #[test]
    fn test_invalid_sheet_name_is_rejected() {
        let sheet = Sheet::from_rows("bad[name]", vec!["A".into()], vec![]).unwrap();
        let model = TabularModel::new(vec![sheet]).unwrap();
        assert!(matches!(
            generate_workbook(&model).unwrap_err(),
            RenderError::Workbook(_)
        ));
    }

    #[test]
    fn test_trailing_row_of_absent_values_is_written() {
        let rows = vec![
            Product {
                id: 1,
                name: Some("Widget"),
                price: Some(9.99),
            },
            Product {
                id: 2,
                name: None,
                price: None,
            },
        ];
        let name_and_price = vec![
            Column::new("NAME", |p: &Product| p.name),
            Column::new("PRICE", |p: &Product| p.price),
        ];
        let model = TabularModel::build("PRODUCT", &name_and_price, &rows).unwrap();

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("absent.xlsx");
        render_workbook(&model, &path).unwrap();

        // The value reader skips empty cells, so look at cell positions.
        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let mut reader = workbook.worksheet_cells_reader("PRODUCT").unwrap();
        let mut positions = Vec::new();
        while let Some(cell) = reader.next_cell().unwrap() {
            positions.push(cell.get_position());
        }
        assert!(positions.contains(&(2, 0)));
        assert!(positions.contains(&(2, 1)));
        assert_eq!(positions.iter().map(|p| p.0).max(), Some(2));
    }

    #[test]
    fn test_unwritable_destination() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("missing").join("report.xlsx");
        assert!(render_workbook(&sample_model(), &path).is_err());
        assert!(!path.exists());
    }
}
