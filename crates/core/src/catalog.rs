//! Field catalog: the authoritative column layout of the registry sheet.
//!
//! The catalog holds three static registries:
//!
//! - the ordered column names, core columns first, then detail columns
//!   (including birth-certificate-only columns that stay empty for other letters),
//! - the letter-type code to display text map,
//! - the detail-field key to column slot map.
//!
//! A catalog is built once at startup and shared as `Arc<FieldCatalog>`. Detail
//! slots are resolved by column name so the slot map cannot drift from the
//! column list.

use crate::constants::{core_column, UNKNOWN_LETTER_TYPE_LABEL};
use crate::error::{RegistryError, RegistryResult};
use std::collections::{BTreeMap, HashSet};

/// Names of the core columns, in position order.
pub const CORE_COLUMNS: [&str; core_column::NUM_COLS] = [
    "ID",
    "Letter Number",
    "Letter Type (Code)",
    "Patient Name",
    "Letter Date",
    "Detail Data (JSON)",
    "Created At",
];

/// Detail-field keys accepted in the detail payload and the column each one fills.
pub const DETAIL_FIELDS: &[(&str, &str)] = &[
    ("age", "Age"),
    ("sex", "Sex"),
    ("address", "Address"),
    ("occupation", "Occupation"),
    ("purpose", "Purpose"),
    ("birth_date", "Birth Date"),
    ("weight", "Weight"),
    ("height", "Height"),
    ("blood_pressure", "Blood Pressure"),
    // Birth certificate
    ("baby_name", "Baby Name"),
    ("mother_name", "Mother Name"),
    ("mother_age", "Mother Age"),
    ("father_name", "Father Name"),
    ("birth_time", "Birth Time"),
    ("birth_mode", "Birth Mode"),
    ("birth_order", "Birth Order"),
    ("phone", "Phone"),
];

/// Letter-type codes and their display text.
pub const LETTER_TYPES: &[(&str, &str)] = &[
    ("SKS", "Health Certificate"),
    ("SKT", "Sick Note"),
    ("SKH", "Pregnancy Certificate"),
    ("SKB", "Delivery Certificate"),
    ("SKL", "Birth Certificate"),
    ("SKK", "Employment Certificate"),
    ("SKBK", "Employment Termination Certificate"),
    ("SR", "Referral Letter"),
    ("SL", "Other"),
];

/// A detail-field key bound to its column position in a catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailSlot {
    pub key: &'static str,
    pub column: usize,
}

/// Ordered column layout plus the lookups derived from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldCatalog {
    columns: Vec<String>,
    letter_types: BTreeMap<&'static str, &'static str>,
    detail_slots: Vec<DetailSlot>,
}

impl FieldCatalog {
    /// The layout currently in effect: core columns followed by every detail column.
    pub fn standard() -> Self {
        let columns = CORE_COLUMNS
            .iter()
            .chain(DETAIL_FIELDS.iter().map(|(_, column)| column))
            .map(|c| (*c).to_string())
            .collect();
        Self::from_columns(columns)
    }

    /// Builds a catalog over an arbitrary ordered column list.
    ///
    /// Detail slots are bound for every detail column present in `columns`; absent
    /// ones are simply not projected.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Catalog` if a column name is blank or repeated.
    pub fn new(columns: Vec<String>) -> RegistryResult<Self> {
        let mut seen = HashSet::new();
        for name in &columns {
            if name.trim().is_empty() {
                return Err(RegistryError::Catalog("column names cannot be empty".into()));
            }
            if !seen.insert(name.as_str()) {
                return Err(RegistryError::Catalog(format!(
                    "duplicate column name: {name}"
                )));
            }
        }
        Ok(Self::from_columns(columns))
    }

    fn from_columns(columns: Vec<String>) -> Self {
        let detail_slots = DETAIL_FIELDS
            .iter()
            .filter_map(|(key, name)| {
                columns
                    .iter()
                    .position(|c| c == *name)
                    .map(|column| DetailSlot { key: *key, column })
            })
            .collect();

        Self {
            columns,
            letter_types: LETTER_TYPES.iter().copied().collect(),
            detail_slots,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Position of a column by name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Whether the first columns are the core columns at their fixed positions.
    ///
    /// Encoding and decoding letter rows is only meaningful for such catalogs.
    pub fn has_core_layout(&self) -> bool {
        self.columns.len() >= CORE_COLUMNS.len()
            && self
                .columns
                .iter()
                .zip(CORE_COLUMNS.iter())
                .all(|(actual, expected)| actual == expected)
    }

    /// Columns the sheet must keep as plain text.
    pub fn text_columns(&self) -> Vec<usize> {
        self.position(CORE_COLUMNS[core_column::DETAIL_DATA])
            .into_iter()
            .collect()
    }

    pub fn detail_slots(&self) -> &[DetailSlot] {
        &self.detail_slots
    }

    /// Display text for a letter-type code, if the code is known.
    pub fn letter_type_label(&self, code: &str) -> Option<&'static str> {
        self.letter_types.get(code).copied()
    }

    /// Display text for a letter-type code, falling back to the unknown label.
    pub fn letter_type_display(&self, code: &str) -> &'static str {
        self.letter_type_label(code)
            .unwrap_or(UNKNOWN_LETTER_TYPE_LABEL)
    }

    /// Known letter types, ordered by code.
    pub fn letter_types(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.letter_types.iter().map(|(code, label)| (*code, *label))
    }
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_layout() {
        let catalog = FieldCatalog::standard();

        assert_eq!(catalog.width(), 24);
        assert!(catalog.has_core_layout());
        assert_eq!(catalog.columns()[core_column::DETAIL_DATA], "Detail Data (JSON)");
        assert_eq!(catalog.columns()[23], "Phone");
        assert_eq!(catalog.text_columns(), vec![core_column::DETAIL_DATA]);
    }

    #[test]
    fn test_standard_catalog_binds_every_detail_field() {
        let catalog = FieldCatalog::standard();

        assert_eq!(catalog.detail_slots().len(), DETAIL_FIELDS.len());
        for slot in catalog.detail_slots() {
            assert!(slot.column >= core_column::NUM_COLS, "{} overlaps core", slot.key);
        }

        let age = catalog
            .detail_slots()
            .iter()
            .find(|s| s.key == "age")
            .unwrap();
        assert_eq!(age.column, 7);

        let phone = catalog
            .detail_slots()
            .iter()
            .find(|s| s.key == "phone")
            .unwrap();
        assert_eq!(phone.column, 23);
    }

    #[test]
    fn test_standard_columns_are_unique() {
        let catalog = FieldCatalog::standard();
        assert!(FieldCatalog::new(catalog.columns().to_vec()).is_ok());
    }

    #[test]
    fn test_letter_type_display() {
        let catalog = FieldCatalog::standard();

        assert_eq!(catalog.letter_type_display("SKL"), "Birth Certificate");
        assert_eq!(catalog.letter_type_display("SR"), "Referral Letter");
        assert_eq!(catalog.letter_type_display("ZZZ"), "unknown");
        assert_eq!(catalog.letter_type_label("ZZZ"), None);
        assert_eq!(catalog.letter_types().count(), LETTER_TYPES.len());
    }

    #[test]
    fn test_new_rejects_duplicate_columns() {
        let result = FieldCatalog::new(vec!["A".into(), "B".into(), "A".into()]);
        assert!(matches!(result, Err(RegistryError::Catalog(_))));
    }

    #[test]
    fn test_new_rejects_blank_columns() {
        let result = FieldCatalog::new(vec!["A".into(), " ".into()]);
        assert!(matches!(result, Err(RegistryError::Catalog(_))));
    }

    #[test]
    fn test_custom_catalog_binds_present_detail_columns_only() {
        let catalog = FieldCatalog::new(vec!["Phone".into(), "Notes".into(), "Age".into()])
            .unwrap();

        assert!(!catalog.has_core_layout());
        assert!(catalog.text_columns().is_empty());
        assert_eq!(
            catalog.detail_slots(),
            &[
                DetailSlot {
                    key: "age",
                    column: 2
                },
                DetailSlot {
                    key: "phone",
                    column: 0
                },
            ]
        );
    }
}
