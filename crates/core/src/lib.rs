//! # Registry Core
//!
//! Core business logic for the clinic letter registry.
//!
//! This crate contains pure data operations over a tabular sheet:
//! - the field catalog (column layout, letter types, detail-field slots),
//! - letter number generation,
//! - encoding letters into rows and decoding rows into history entries,
//! - schema reconciliation and migration of stored rows,
//! - the store adapter serialising access to the sheet.
//!
//! **No API concerns**: HTTP servers and request envelopes belong in `api-rest` and
//! `api-shared`.

pub mod catalog;
pub mod codec;
pub mod config;
pub mod constants;
pub mod dates;
pub mod error;
pub mod numbering;
pub mod registry;
pub mod schema;
pub mod sheet;
pub mod store;

pub use catalog::FieldCatalog;
pub use codec::{HistoryEntry, NewLetter, RecordCodec};
pub use config::RegistryConfig;
pub use dates::DateLocale;
pub use error::{RegistryError, RegistryResult};
pub use numbering::{LetterNumber, LetterNumberGenerator};
pub use registry::{IssuedLetter, LetterRegistry};
pub use schema::{MigrationReport, SchemaOutcome};
pub use sheet::{JsonLinesSheet, MemorySheet, Sheet};

pub use registry_types::{ClinicCode, LetterTypeCode, NonEmptyText, TextError};
