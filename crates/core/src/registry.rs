//! Letter registry service.
//!
//! Ties the field catalog, schema reconciler, numbering generator, record codec and
//! store adapter together. Each call takes the store lock once:
//!
//! - `add_letter`: reconcile schema → read row count → number → encode → append
//! - `history`: reconcile schema → read rows, then decode newest first
//!
//! The sheet is append-only; nothing here updates or deletes a stored row.

use crate::catalog::FieldCatalog;
use crate::codec::{HistoryEntry, NewLetter, RecordCodec};
use crate::config::RegistryConfig;
use crate::dates::DateLocale;
use crate::error::{RegistryError, RegistryResult};
use crate::numbering::{LetterNumber, LetterNumberGenerator};
use crate::schema::{ensure_schema, SchemaOutcome};
use crate::sheet::Sheet;
use crate::store::RegistryStore;
use chrono::{DateTime, Utc};
use registry_types::ClinicCode;
use std::sync::Arc;

/// Result of registering a letter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuedLetter {
    pub sequence: u64,
    pub letter_number: LetterNumber,
    pub created_at: DateTime<Utc>,
}

pub struct LetterRegistry<S = Box<dyn Sheet>> {
    store: RegistryStore<S>,
    catalog: Arc<FieldCatalog>,
    numbering: LetterNumberGenerator,
    codec: RecordCodec,
}

impl LetterRegistry {
    /// Opens the file-backed registry described by `cfg` with the standard catalog.
    ///
    /// Nothing is read or written until the first operation.
    pub fn open(cfg: &RegistryConfig) -> RegistryResult<Self> {
        Self::new(
            Box::new(cfg.sheet()),
            Arc::new(FieldCatalog::standard()),
            cfg.clinic_code().clone(),
            cfg.date_locale(),
        )
    }
}

impl<S: Sheet> LetterRegistry<S> {
    /// # Errors
    ///
    /// Returns `RegistryError::Catalog` if `catalog` does not start with the core columns.
    pub fn new(
        sheet: S,
        catalog: Arc<FieldCatalog>,
        clinic_code: ClinicCode,
        date_locale: DateLocale,
    ) -> RegistryResult<Self> {
        if !catalog.has_core_layout() {
            return Err(RegistryError::Catalog(
                "catalog must start with the core columns".into(),
            ));
        }

        Ok(Self {
            store: RegistryStore::new(sheet),
            codec: RecordCodec::new(Arc::clone(&catalog), date_locale),
            numbering: LetterNumberGenerator::new(clinic_code),
            catalog,
        })
    }

    pub fn catalog(&self) -> &Arc<FieldCatalog> {
        &self.catalog
    }

    pub fn store(&self) -> &RegistryStore<S> {
        &self.store
    }

    /// Runs schema reconciliation on its own.
    pub fn reconcile(&self) -> RegistryResult<SchemaOutcome> {
        let mut handle = self.store.lock()?;
        ensure_schema(handle.sheet_mut(), &self.catalog)
    }

    /// Registers a letter and returns its number.
    ///
    /// # Errors
    ///
    /// Returns the store's lock, read or write error, or a migration failure. Nothing
    /// is appended when an error is returned.
    pub fn add_letter(&self, letter: NewLetter) -> RegistryResult<IssuedLetter> {
        let mut handle = self.store.lock()?;
        ensure_schema(handle.sheet_mut(), &self.catalog)?;

        let created_at = Utc::now();
        let issued = handle.append_with(|count| {
            let sequence = LetterNumberGenerator::sequence_for(count);
            let letter_number =
                self.numbering
                    .next_letter_number(&letter.letter_type, letter.letter_date, count);
            let row = self
                .codec
                .encode(&letter, sequence, &letter_number, created_at);

            Ok((
                row,
                IssuedLetter {
                    sequence,
                    letter_number,
                    created_at,
                },
            ))
        })?;

        tracing::info!(
            "registered letter {} ({}) as sequence {}",
            issued.letter_number,
            letter.letter_type,
            issued.sequence
        );
        Ok(issued)
    }

    /// Issuance history, most recently appended first.
    pub fn history(&self) -> RegistryResult<Vec<HistoryEntry>> {
        let rows = {
            let mut handle = self.store.lock()?;
            ensure_schema(handle.sheet_mut(), &self.catalog)?;
            handle.read_all_rows()?
        };

        let mut entries: Vec<HistoryEntry> = rows
            .iter()
            .enumerate()
            .map(|(index, row)| self.codec.decode(row, index + 1))
            .collect();
        entries.reverse();
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CORE_COLUMNS;
    use crate::constants::core_column;
    use crate::sheet::{JsonLinesSheet, MemorySheet};
    use serde_json::json;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn registry() -> LetterRegistry<MemorySheet> {
        LetterRegistry::new(
            MemorySheet::new("letters"),
            Arc::new(FieldCatalog::standard()),
            ClinicCode::new("KNP").unwrap(),
            DateLocale::Indonesian,
        )
        .unwrap()
    }

    fn letter(letter_type: &str, patient: &str, date: &str) -> NewLetter {
        NewLetter::parse(letter_type, patient, date, r#"{"age":"30"}"#).unwrap()
    }

    #[test]
    fn test_first_letter_is_numbered_001() {
        let registry = registry();

        let issued = registry
            .add_letter(letter("sks", "Budi Santoso", "2025-01-20"))
            .unwrap();

        assert_eq!(issued.sequence, 1);
        assert_eq!(issued.letter_number.as_str(), "001/SKS/KNP/I/2025");
    }

    #[test]
    fn test_sequence_ids_are_contiguous_across_types() {
        let registry = registry();
        let types = ["SKS", "SKL", "SR", "ZZZ", "SKT"];

        let numbers: Vec<IssuedLetter> = types
            .iter()
            .map(|t| registry.add_letter(letter(t, "Pasien", "2025-05-05")).unwrap())
            .collect();

        let sequences: Vec<u64> = numbers.iter().map(|i| i.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3, 4, 5]);

        let unique: HashSet<_> = numbers.iter().map(|i| i.letter_number.clone()).collect();
        assert_eq!(unique.len(), types.len());

        let handle = registry.store().lock().unwrap();
        let stored: Vec<_> = handle
            .read_all_rows()
            .unwrap()
            .iter()
            .map(|r| r[core_column::ID].clone())
            .collect();
        assert_eq!(stored, vec![json!(1), json!(2), json!(3), json!(4), json!(5)]);
    }

    #[test]
    fn test_history_is_most_recent_first() {
        let registry = registry();
        registry.add_letter(letter("SKS", "X", "2025-01-01")).unwrap();
        registry.add_letter(letter("SKT", "Y", "2025-01-02")).unwrap();
        registry.add_letter(letter("SR", "Z", "2025-01-03")).unwrap();

        let history = registry.history().unwrap();

        let names: Vec<&str> = history.iter().map(|e| e.patient_name.as_str()).collect();
        assert_eq!(names, vec!["Z", "Y", "X"]);
        assert_eq!(history[0].id, 3);
        assert_eq!(history[0].letter_type_text, "Referral Letter");
        assert_eq!(history[2].letter_date_formatted, "01 Januari 2025");
    }

    #[test]
    fn test_history_on_fresh_registry_creates_sheet_and_is_empty() {
        let registry = registry();

        assert!(registry.history().unwrap().is_empty());

        let handle = registry.store().lock().unwrap();
        assert_eq!(handle.current_count().unwrap(), 1);
    }

    #[test]
    fn test_unknown_letter_type_is_registered() {
        let registry = registry();

        let issued = registry
            .add_letter(letter("zzz", "Ani", "2025-07-14"))
            .unwrap();
        let history = registry.history().unwrap();

        assert_eq!(issued.letter_number.as_str(), "001/ZZZ/KNP/VII/2025");
        assert_eq!(history[0].letter_type, "ZZZ");
        assert_eq!(history[0].letter_type_text, "unknown");
    }

    #[test]
    fn test_reconcile_twice_writes_once() {
        let registry = registry();

        assert_eq!(registry.reconcile().unwrap(), SchemaOutcome::Created);
        assert_eq!(registry.reconcile().unwrap(), SchemaOutcome::Unchanged);

        let handle = registry.store().lock().unwrap();
        assert_eq!(handle.sheet().mutations(), 1);
    }

    #[test]
    fn test_old_layout_is_migrated_before_append() {
        // A sheet written before the detail columns existed.
        let old_header: Vec<String> = CORE_COLUMNS.iter().map(|c| c.to_string()).collect();
        let old_row = vec![
            json!(1),
            json!("001/SKS/KNP/II/2024"),
            json!("SKS"),
            json!("Lama"),
            json!("2024-02-10"),
            json!(r#"{"age":"41"}"#),
            json!("2024-02-10T01:00:00.000Z"),
        ];
        let sheet = MemorySheet::with_content("letters", old_header, vec![old_row]);
        let registry = LetterRegistry::new(
            sheet,
            Arc::new(FieldCatalog::standard()),
            ClinicCode::new("KNP").unwrap(),
            DateLocale::Indonesian,
        )
        .unwrap();

        let issued = registry
            .add_letter(letter("SKT", "Baru", "2025-02-11"))
            .unwrap();

        assert_eq!(issued.letter_number.as_str(), "002/SKT/KNP/II/2025");
        let handle = registry.store().lock().unwrap();
        let rows = handle.read_all_rows().unwrap();
        assert_eq!(handle.sheet().read_header().unwrap(), registry.catalog().columns());
        assert!(rows.iter().all(|r| r.len() == 24));
        assert_eq!(rows[0][core_column::PATIENT_NAME], json!("Lama"));
        assert_eq!(rows[0][7], json!(""));
        assert_eq!(rows[1][7], json!("30"));
    }

    #[test]
    fn test_rejects_catalog_without_core_columns() {
        let catalog = FieldCatalog::new(vec!["A".into(), "B".into()]).unwrap();

        let result = LetterRegistry::new(
            MemorySheet::new("letters"),
            Arc::new(catalog),
            ClinicCode::new("KNP").unwrap(),
            DateLocale::Indonesian,
        );

        assert!(matches!(result, Err(RegistryError::Catalog(_))));
    }

    #[test]
    fn test_file_backed_registry_persists_across_reopen() {
        let temp = TempDir::new().unwrap();
        let cfg = RegistryConfig::from_env_values(
            Some(temp.path().display().to_string()),
            None,
            None,
            Some("en".into()),
        )
        .unwrap();

        let detail = r#"{"mother_name":"Sari","birth_time":"04:15"}"#;
        {
            let registry = LetterRegistry::open(&cfg).unwrap();
            registry
                .add_letter(NewLetter::parse("SKL", "Sari", "2025-10-01", detail).unwrap())
                .unwrap();
        }

        let registry = LetterRegistry::open(&cfg).unwrap();
        let issued = registry
            .add_letter(letter("SKS", "Joko", "2025-10-02"))
            .unwrap();
        let history = registry.history().unwrap();

        assert_eq!(issued.letter_number.as_str(), "002/SKS/KNP/X/2025");
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].detail_data, detail);
        assert_eq!(history[1].letter_date_formatted, "01 October 2025");

        let sheet = JsonLinesSheet::new(temp.path(), "letter_registry");
        let rows = sheet.read_rows().unwrap();
        assert_eq!(rows[0][core_column::DETAIL_DATA], json!(detail));
    }

    #[test]
    fn test_zero_byte_sheet_file_is_recreated() {
        let temp = TempDir::new().unwrap();
        let cfg = RegistryConfig::from_env_values(
            Some(temp.path().display().to_string()),
            None,
            None,
            None,
        )
        .unwrap();
        std::fs::write(cfg.sheet().path(), b"").unwrap();

        let registry = LetterRegistry::open(&cfg).unwrap();
        let issued = registry
            .add_letter(letter("SKS", "Joko", "2025-06-01"))
            .unwrap();

        assert_eq!(issued.letter_number.as_str(), "001/SKS/KNP/VI/2025");
        assert_eq!(registry.history().unwrap().len(), 1);
    }
}
