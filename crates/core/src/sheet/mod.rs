//! Tabular media backing the registry.
//!
//! A sheet is a header row followed by data rows. The registry relies on nothing
//! more than the [`Sheet`] contract: check existence, create with a header, read
//! the header, read all data rows, count rows, append one row, and replace the
//! whole content in place. Rows are never updated or deleted individually.
//!
//! Two media are provided:
//!
//! - [`MemorySheet`]: process-local, used by tests and ephemeral deployments,
//! - [`JsonLinesSheet`]: a file with one JSON document per line.

mod jsonl;
mod memory;

pub use jsonl::JsonLinesSheet;
pub use memory::MemorySheet;

use crate::constants::HEADER_ROWS;
use crate::error::RegistryResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single cell. Text, numbers and booleans are stored as JSON scalars.
pub type Cell = Value;

/// One data row, positionally aligned with the header.
pub type Row = Vec<Cell>;

/// The empty cell value.
pub fn empty_cell() -> Cell {
    Value::String(String::new())
}

/// Human-readable text of a cell; `null` and the empty string are both blank.
pub fn cell_text(cell: &Cell) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Header and presentation metadata of a sheet.
///
/// `frozen_rows` and `text_columns` mirror spreadsheet formatting: the header row is
/// frozen and text columns are never reinterpreted as numbers or dates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetLayout {
    pub header: Vec<String>,
    #[serde(default)]
    pub frozen_rows: usize,
    #[serde(default)]
    pub text_columns: Vec<usize>,
}

impl SheetLayout {
    /// A layout with the header row frozen.
    pub fn new(header: Vec<String>, text_columns: Vec<usize>) -> Self {
        Self {
            header,
            frozen_rows: HEADER_ROWS,
            text_columns,
        }
    }

    /// Coerces the cells of text columns to plain strings.
    pub fn apply_text_format(&self, row: &mut Row) {
        for &column in &self.text_columns {
            if let Some(cell) = row.get_mut(column) {
                if !cell.is_string() {
                    *cell = Value::String(cell_text(cell));
                }
            }
        }
    }
}

/// Contract of a tabular medium.
pub trait Sheet: Send {
    /// Sheet name, for logs.
    fn name(&self) -> &str;

    fn exists(&self) -> RegistryResult<bool>;

    /// Creates the sheet with the given header and formatting.
    fn create(&mut self, layout: &SheetLayout) -> RegistryResult<()>;

    /// Reads the header row. Trailing blank header cells are not returned.
    fn read_header(&self) -> RegistryResult<Vec<String>>;

    /// Reads every data row in append order.
    fn read_rows(&self) -> RegistryResult<Vec<Row>>;

    /// Number of the last used row, counting the header; 0 when the sheet is empty.
    fn last_row(&self) -> RegistryResult<usize>;

    /// Appends one data row after the last row.
    fn append_row(&mut self, row: Row) -> RegistryResult<()>;

    /// Clears the sheet and writes `layout` and `rows` in their place.
    fn rewrite(&mut self, layout: &SheetLayout, rows: Vec<Row>) -> RegistryResult<()>;
}

impl<S: Sheet + ?Sized> Sheet for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn exists(&self) -> RegistryResult<bool> {
        (**self).exists()
    }

    fn create(&mut self, layout: &SheetLayout) -> RegistryResult<()> {
        (**self).create(layout)
    }

    fn read_header(&self) -> RegistryResult<Vec<String>> {
        (**self).read_header()
    }

    fn read_rows(&self) -> RegistryResult<Vec<Row>> {
        (**self).read_rows()
    }

    fn last_row(&self) -> RegistryResult<usize> {
        (**self).last_row()
    }

    fn append_row(&mut self, row: Row) -> RegistryResult<()> {
        (**self).append_row(row)
    }

    fn rewrite(&mut self, layout: &SheetLayout, rows: Vec<Row>) -> RegistryResult<()> {
        (**self).rewrite(layout, rows)
    }
}

pub(crate) fn trim_trailing_blank(mut header: Vec<String>) -> Vec<String> {
    while header.last().is_some_and(|h| h.trim().is_empty()) {
        header.pop();
    }
    header
}
