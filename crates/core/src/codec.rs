//! Record codec: letter payloads to sheet rows and back.
//!
//! Encoding writes the core columns, keeps the caller's detail payload verbatim in
//! the backup column and projects recognised detail keys into their own columns.
//! Decoding only needs the core columns; the projected detail columns exist for
//! people reading the sheet directly.

use crate::catalog::FieldCatalog;
use crate::constants::{core_column, MISSING_DATE_PLACEHOLDER};
use crate::dates::{format_iso, format_long, parse_letter_date, DateLocale};
use crate::error::{RegistryError, RegistryResult};
use crate::numbering::LetterNumber;
use crate::sheet::{cell_text, empty_cell, Cell, Row};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use registry_types::{LetterTypeCode, NonEmptyText};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// A validated request to register a letter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewLetter {
    pub letter_type: LetterTypeCode,
    pub patient_name: NonEmptyText,
    pub letter_date: NaiveDate,
    /// Detail payload exactly as received; expected to be a JSON object.
    pub detail_data: String,
}

impl NewLetter {
    /// Validates raw request fields.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Text` for a blank letter type or patient name and
    /// `RegistryError::InvalidLetterDate` if `letter_date` is not a date.
    pub fn parse(
        letter_type: &str,
        patient_name: &str,
        letter_date: &str,
        detail_data: impl Into<String>,
    ) -> RegistryResult<Self> {
        let letter_date =
            parse_letter_date(letter_date).ok_or_else(|| RegistryError::InvalidLetterDate {
                value: letter_date.to_string(),
            })?;

        Ok(Self {
            letter_type: LetterTypeCode::new(letter_type)?,
            patient_name: NonEmptyText::new(patient_name)?,
            letter_date,
            detail_data: detail_data.into(),
        })
    }
}

/// One line of issuance history, as shown to users.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: u64,
    pub letter_number: String,
    pub letter_type: String,
    pub letter_type_text: String,
    pub patient_name: String,
    /// `YYYY-MM-DD`, or empty when the stored date is invalid.
    pub letter_date: String,
    /// Long form such as `05 Agustus 2025`, or `N/A`.
    pub letter_date_formatted: String,
    /// Verbatim detail payload.
    pub detail_data: String,
}

/// Parses the detail payload into an object.
///
/// Invalid JSON, or JSON that is not an object, yields an empty object: the letter
/// is still registered and the raw text still lands in the backup column.
pub fn parse_detail_payload(raw: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            tracing::warn!("detail payload is not a JSON object; detail columns left empty");
            Map::new()
        }
        Err(e) => {
            tracing::warn!("failed to parse detail payload: {}", e);
            Map::new()
        }
    }
}

fn detail_cell(value: &Value) -> Cell {
    match value {
        Value::Null => empty_cell(),
        Value::String(_) | Value::Number(_) | Value::Bool(_) => value.clone(),
        nested => Value::String(nested.to_string()),
    }
}

fn sequence_id(cell: Option<&Cell>) -> Option<u64> {
    match cell? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Clone, Debug)]
pub struct RecordCodec {
    catalog: Arc<FieldCatalog>,
    locale: DateLocale,
}

impl RecordCodec {
    pub fn new(catalog: Arc<FieldCatalog>, locale: DateLocale) -> Self {
        Self { catalog, locale }
    }

    /// Flattens a letter into a row of catalog width.
    pub fn encode(
        &self,
        letter: &NewLetter,
        sequence: u64,
        letter_number: &LetterNumber,
        created_at: DateTime<Utc>,
    ) -> Row {
        let mut row = vec![empty_cell(); self.catalog.width()];

        row[core_column::ID] = Value::from(sequence);
        row[core_column::LETTER_NUMBER] = Value::String(letter_number.to_string());
        row[core_column::LETTER_TYPE] = Value::String(letter.letter_type.to_string());
        row[core_column::PATIENT_NAME] = Value::String(letter.patient_name.to_string());
        row[core_column::LETTER_DATE] = Value::String(format_iso(letter.letter_date));
        row[core_column::DETAIL_DATA] = Value::String(letter.detail_data.clone());
        row[core_column::CREATED_AT] =
            Value::String(created_at.to_rfc3339_opts(SecondsFormat::Millis, true));

        let details = parse_detail_payload(&letter.detail_data);
        for slot in self.catalog.detail_slots() {
            if let Some(value) = details.get(slot.key) {
                row[slot.column] = detail_cell(value);
            }
        }

        row
    }

    /// Rebuilds a history entry from a stored row.
    ///
    /// `ordinal` is the 1-based position of the row among data rows; it stands in
    /// for the sequence id when the stored id is not a whole number.
    pub fn decode(&self, row: &Row, ordinal: usize) -> HistoryEntry {
        let text = |column: usize| row.get(column).map(cell_text).unwrap_or_default();

        let letter_type = text(core_column::LETTER_TYPE);
        let letter_date = parse_letter_date(&text(core_column::LETTER_DATE));

        HistoryEntry {
            id: sequence_id(row.get(core_column::ID)).unwrap_or(ordinal as u64),
            letter_number: text(core_column::LETTER_NUMBER),
            letter_type_text: self.catalog.letter_type_display(&letter_type).to_string(),
            letter_type,
            patient_name: text(core_column::PATIENT_NAME),
            letter_date: letter_date.map(format_iso).unwrap_or_default(),
            letter_date_formatted: letter_date
                .map(|d| format_long(d, self.locale))
                .unwrap_or_else(|| MISSING_DATE_PLACEHOLDER.to_string()),
            detail_data: text(core_column::DETAIL_DATA),
        }
    }
}
