//! Format-neutral tabular model shared by every renderer.
//!
//! A [`TabularModel`] is a list of named [`Sheet`]s. Each sheet keeps its
//! column keys as an explicit ordered list and its rows as key → display
//! string maps. Renderers walk the key list, never the map, so column order
//! is always the declared order.

use std::collections::{HashMap, HashSet};
use std::fmt::Display;

use tracing::debug;

use crate::error::ModelError;

/// One row of a sheet: column key → display value.
pub type Row = HashMap<String, String>;

/// Convert an optional value to its display string. Absent values become "".
pub fn display_value<V: Display>(value: Option<V>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// A column definition: a key plus the accessor that extracts its value
/// from a domain row.
pub struct Column<'a, T> {
    key: String,
    extract: Box<dyn Fn(&T) -> String + Send + Sync + 'a>,
}

impl<'a, T> Column<'a, T> {
    pub fn new<V, F>(key: impl Into<String>, extract: F) -> Self
    where
        V: Display,
        F: Fn(&T) -> Option<V> + Send + Sync + 'a,
    {
        Self {
            key: key.into(),
            extract: Box::new(move |row: &T| display_value(extract(row))),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Display string of this column for `row`.
    pub fn display(&self, row: &T) -> String {
        (self.extract)(row)
    }
}

impl<T> std::fmt::Debug for Column<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column").field("key", &self.key).finish()
    }
}

/// A named table inside a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    name: String,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Sheet {
    /// Assemble a sheet from pre-built rows.
    ///
    /// Only column uniqueness is checked here. Row completeness is verified
    /// by [`Sheet::ordered_rows`] when the sheet is rendered.
    pub fn from_rows(
        name: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Row>,
    ) -> Result<Self, ModelError> {
        let name = name.into();
        check_unique_columns(&name, columns.iter().map(String::as_str))?;
        Ok(Self {
            name,
            columns,
            rows,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Rows as cell lists in declared column order.
    ///
    /// Fails if any row lacks a declared column or carries an undeclared one.
    pub fn ordered_rows(&self) -> Result<Vec<Vec<&str>>, ModelError> {
        self.rows
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                if row.len() > self.columns.len() {
                    let unknown = row
                        .keys()
                        .find(|key| !self.columns.contains(*key))
                        .cloned()
                        .unwrap_or_default();
                    return Err(ModelError::UnknownColumn {
                        sheet: self.name.clone(),
                        row: idx,
                        column: unknown,
                    });
                }
                let cells = self
                    .columns
                    .iter()
                    .map(|column| {
                        row.get(column)
                            .map(String::as_str)
                            .ok_or_else(|| ModelError::MissingCell {
                                sheet: self.name.clone(),
                                row: idx,
                                column: column.clone(),
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(cells)
            })
            .collect()
    }
}

/// Flatten `rows` into a sheet using the given column definitions.
///
/// The result has one row per input, in input order, and every row has an
/// entry for every column.
pub fn build_sheet<T>(
    name: impl Into<String>,
    columns: &[Column<'_, T>],
    rows: &[T],
) -> Result<Sheet, ModelError> {
    let name = name.into();
    check_unique_columns(&name, columns.iter().map(Column::key))?;

    let table_rows = rows
        .iter()
        .map(|item| {
            columns
                .iter()
                .map(|column| (column.key.clone(), column.display(item)))
                .collect::<Row>()
        })
        .collect::<Vec<_>>();

    debug!(
        sheet = %name,
        columns = columns.len(),
        rows = table_rows.len(),
        "Built sheet"
    );

    Ok(Sheet {
        name,
        columns: columns.iter().map(|c| c.key.clone()).collect(),
        rows: table_rows,
    })
}

/// An immutable, non-empty set of uniquely named sheets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularModel {
    sheets: Vec<Sheet>,
}

impl TabularModel {
    pub fn new(sheets: Vec<Sheet>) -> Result<Self, ModelError> {
        if sheets.is_empty() {
            return Err(ModelError::NoSheets);
        }
        let mut seen = HashSet::new();
        for sheet in &sheets {
            if !seen.insert(sheet.name.as_str()) {
                return Err(ModelError::DuplicateSheet(sheet.name.clone()));
            }
        }
        Ok(Self { sheets })
    }

    /// Build a single-sheet model from domain rows.
    pub fn build<T>(
        sheet_name: impl Into<String>,
        columns: &[Column<'_, T>],
        rows: &[T],
    ) -> Result<Self, ModelError> {
        Self::new(vec![build_sheet(sheet_name, columns, rows)?])
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

fn check_unique_columns<'a>(
    sheet: &str,
    columns: impl Iterator<Item = &'a str>,
) -> Result<(), ModelError> {
    let mut seen = HashSet::new();
    for column in columns {
        if !seen.insert(column) {
            return Err(ModelError::DuplicateColumn {
                sheet: sheet.to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}
