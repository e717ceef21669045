//! Constants used throughout the registry core crate.
//!
//! Column positions, defaults and file names live here so that every component
//! refers to the same values.

/// Default directory for the registry sheet when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "registry_data";

/// Default sheet name (also the file stem of the JSON-lines sheet).
pub const DEFAULT_SHEET_NAME: &str = "letter_registry";

/// Default clinic code embedded in letter numbers.
pub const DEFAULT_CLINIC_CODE: &str = "KNP";

/// File extension for JSON-lines sheets.
pub const SHEET_FILE_EXTENSION: &str = "jsonl";

/// Display text for letter-type codes missing from the catalog.
pub const UNKNOWN_LETTER_TYPE_LABEL: &str = "unknown";

/// Long-form date placeholder when the stored letter date is missing or invalid.
pub const MISSING_DATE_PLACEHOLDER: &str = "N/A";

/// Message returned after a letter has been registered.
pub const LETTER_ADDED_MESSAGE: &str = "Letter registered successfully";

/// Minimum number of digits for the sequence segment of a letter number.
pub const SEQUENCE_MIN_DIGITS: usize = 3;

/// Number of header rows at the top of every sheet.
pub const HEADER_ROWS: usize = 1;

/// Fixed positions of the core columns, 0-based.
///
/// Layout:
/// ```text
/// 0 ID | 1 Letter Number | 2 Letter Type (Code) | 3 Patient Name
/// 4 Letter Date | 5 Detail Data (JSON) | 6 Created At | 7.. detail columns
/// ```
pub mod core_column {
    /// Sequence id.
    pub const ID: usize = 0;
    /// Formatted letter number.
    pub const LETTER_NUMBER: usize = 1;
    /// Uppercased letter-type code.
    pub const LETTER_TYPE: usize = 2;
    /// Patient name.
    pub const PATIENT_NAME: usize = 3;
    /// Caller-chosen letter date.
    pub const LETTER_DATE: usize = 4;
    /// Verbatim detail payload; always plain text.
    pub const DETAIL_DATA: usize = 5;
    /// Append timestamp.
    pub const CREATED_AT: usize = 6;

    /// Number of core columns preceding the detail columns.
    pub const NUM_COLS: usize = 7;
}
