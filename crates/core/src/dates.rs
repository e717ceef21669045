//! Letter date parsing and rendering.
//!
//! Letter dates travel as ISO `YYYY-MM-DD` strings. Stored values written by older
//! deployments may carry a full timestamp, so parsing also accepts RFC 3339 and
//! naive `YYYY-MM-DDTHH:MM:SS` forms and keeps only the calendar date.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use std::fmt;
use std::str::FromStr;

const ISO_DATE: &str = "%Y-%m-%d";

const MONTHS_ID: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

const MONTHS_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Locale used for long-form letter dates in the history view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DateLocale {
    /// `05 Januari 2025`
    #[default]
    Indonesian,
    /// `05 January 2025`
    English,
}

impl DateLocale {
    fn month_name(self, month: u32) -> &'static str {
        let names = match self {
            DateLocale::Indonesian => &MONTHS_ID,
            DateLocale::English => &MONTHS_EN,
        };
        names[(month as usize).saturating_sub(1).min(11)]
    }

    pub fn tag(self) -> &'static str {
        match self {
            DateLocale::Indonesian => "id",
            DateLocale::English => "en",
        }
    }
}

impl fmt::Display for DateLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for DateLocale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" | "id-id" => Ok(DateLocale::Indonesian),
            "en" | "en-gb" | "en-us" => Ok(DateLocale::English),
            other => Err(format!("unsupported date locale: {other}")),
        }
    }
}

/// Parses a letter date, accepting `YYYY-MM-DD`, RFC 3339 or a naive timestamp.
pub fn parse_letter_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(value, ISO_DATE)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}

/// Normalised `YYYY-MM-DD` rendering.
pub fn format_iso(date: NaiveDate) -> String {
    date.format(ISO_DATE).to_string()
}

/// Long-form rendering: two-digit day, full month name, year.
pub fn format_long(date: NaiveDate, locale: DateLocale) -> String {
    format!(
        "{:02} {} {}",
        date.day(),
        locale.month_name(date.month()),
        date.year()
    )
}
