//! Letter number generation.
//!
//! A letter number has five `/`-separated segments:
//!
//! ```text
//! 007/SKS/KNP/IX/2025
//! │   │   │   │  └─ year of the letter date
//! │   │   │   └──── month of the letter date as a Roman numeral
//! │   │   └──────── clinic code
//! │   └──────────── uppercased letter-type code
//! └──────────────── sequence, zero-padded to at least three digits
//! ```
//!
//! The sequence is the sheet's row count *including the header row* before the
//! insert, so an empty sheet (header only) yields `001` and data rows are numbered
//! 1..N in append order.

use crate::constants::SEQUENCE_MIN_DIGITS;
use chrono::{Datelike, NaiveDate};
use registry_types::{ClinicCode, LetterTypeCode, LETTER_NUMBER_SEPARATOR};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

const ROMAN_MONTHS: [&str; 12] = [
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII",
];

/// Roman numeral for a calendar month; values outside 1..=12 are returned as decimals.
pub fn month_to_roman(month: u32) -> Cow<'static, str> {
    match month {
        1..=12 => Cow::Borrowed(ROMAN_MONTHS[month as usize - 1]),
        other => Cow::Owned(other.to_string()),
    }
}

/// A formatted letter number.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LetterNumber(String);

impl LetterNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for LetterNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Formats letter numbers for one clinic.
#[derive(Clone, Debug)]
pub struct LetterNumberGenerator {
    clinic_code: ClinicCode,
}

impl LetterNumberGenerator {
    pub fn new(clinic_code: ClinicCode) -> Self {
        Self { clinic_code }
    }

    /// Sequence value the next appended row receives.
    ///
    /// `current_row_count` counts the header row plus existing data rows.
    pub fn sequence_for(current_row_count: usize) -> u64 {
        current_row_count as u64
    }

    /// Next letter number for a letter of `letter_type` dated `letter_date`.
    ///
    /// Pure: the same inputs always produce the same number.
    pub fn next_letter_number(
        &self,
        letter_type: &LetterTypeCode,
        letter_date: NaiveDate,
        current_row_count: usize,
    ) -> LetterNumber {
        let sequence = Self::sequence_for(current_row_count);
        let sep = LETTER_NUMBER_SEPARATOR;
        LetterNumber(format!(
            "{sequence:0width$}{sep}{letter_type}{sep}{clinic}{sep}{month}{sep}{year}",
            width = SEQUENCE_MIN_DIGITS,
            letter_type = letter_type.as_str(),
            clinic = self.clinic_code.as_str(),
            month = month_to_roman(letter_date.month()),
            year = letter_date.year(),
        ))
    }
}
