//! Schema reconciliation.
//!
//! Before any detail data is read or written, the sheet's header row must equal
//! the field catalog. [`ensure_schema`] creates a missing sheet, leaves a matching
//! one untouched, and migrates a drifted one:
//!
//! 1. every data row is read under the old header (all reads happen before any write),
//! 2. values move to the new position of the column with the same name,
//! 3. columns missing from the catalog are dropped,
//! 4. catalog columns missing from the old header stay empty,
//! 5. the sheet is rewritten in one call, rows in their original order.
//!
//! The verbatim detail backup column keeps its name across layouts, so the full
//! detail payload survives even when individual detail columns are dropped.

use crate::catalog::FieldCatalog;
use crate::error::RegistryResult;
use crate::sheet::{empty_cell, Row, Sheet, SheetLayout};
use std::collections::HashSet;

/// What [`ensure_schema`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaOutcome {
    /// The sheet did not exist and was created with the catalog header.
    Created,
    /// The header already matched; nothing was written.
    Unchanged,
    /// The sheet was rewritten under the catalog header.
    Migrated(MigrationReport),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Data rows carried over.
    pub rows: usize,
    /// Old columns with no counterpart in the catalog.
    pub dropped_columns: Vec<String>,
    /// Catalog columns left empty for pre-existing rows.
    pub added_columns: Vec<String>,
}

/// Layout written for a catalog: frozen header, backup column as text.
pub fn catalog_layout(catalog: &FieldCatalog) -> SheetLayout {
    SheetLayout::new(catalog.columns().to_vec(), catalog.text_columns())
}

/// Pairs of (old index, new index) for columns present in both headers.
///
/// When the old header repeats a name, its first occurrence wins.
fn column_mapping(old_header: &[String], new_header: &[String]) -> Vec<(usize, usize)> {
    let mut claimed = HashSet::new();
    old_header
        .iter()
        .enumerate()
        .filter_map(|(old_index, name)| {
            let new_index = new_header.iter().position(|c| c == name)?;
            claimed.insert(new_index).then_some((old_index, new_index))
        })
        .collect()
}

/// Moves every row's values from `old_header` positions to `new_header` positions by
/// column name. Output rows are exactly `new_header.len()` wide.
pub fn remap_rows(old_header: &[String], rows: Vec<Row>, new_header: &[String]) -> Vec<Row> {
    let mapping = column_mapping(old_header, new_header);
    rows.into_iter()
        .map(|row| {
            let mut remapped = vec![empty_cell(); new_header.len()];
            for &(old_index, new_index) in &mapping {
                if let Some(value) = row.get(old_index) {
                    remapped[new_index] = value.clone();
                }
            }
            remapped
        })
        .collect()
}

/// Brings the sheet's header in line with `catalog`, migrating rows if needed.
///
/// # Errors
///
/// Returns the sheet's read or write error. A read failure happens before anything
/// is written; a failed rewrite leaves the sheet as atomic as its medium makes it.
pub fn ensure_schema<S: Sheet + ?Sized>(
    sheet: &mut S,
    catalog: &FieldCatalog,
) -> RegistryResult<SchemaOutcome> {
    if !sheet.exists()? {
        sheet.create(&catalog_layout(catalog))?;
        tracing::info!("created sheet '{}' with {} columns", sheet.name(), catalog.width());
        return Ok(SchemaOutcome::Created);
    }

    let current = sheet.read_header()?;
    if current.as_slice() == catalog.columns() {
        return Ok(SchemaOutcome::Unchanged);
    }

    let rows = sheet.read_rows()?;
    let report = MigrationReport {
        rows: rows.len(),
        dropped_columns: current
            .iter()
            .filter(|c| catalog.position(c).is_none())
            .cloned()
            .collect(),
        added_columns: catalog
            .columns()
            .iter()
            .filter(|c| !current.contains(*c))
            .cloned()
            .collect(),
    };

    let remapped = remap_rows(&current, rows, catalog.columns());
    sheet.rewrite(&catalog_layout(catalog), remapped)?;

    tracing::info!(
        "migrated sheet '{}' to new header: {} rows, dropped {:?}, added {:?}",
        sheet.name(),
        report.rows,
        report.dropped_columns,
        report.added_columns
    );
    Ok(SchemaOutcome::Migrated(report))
}
