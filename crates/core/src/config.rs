//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the
//! registry. Request handling never reads environment variables.

use crate::constants::{DEFAULT_CLINIC_CODE, DEFAULT_DATA_DIR, DEFAULT_SHEET_NAME};
use crate::dates::DateLocale;
use crate::error::{RegistryError, RegistryResult};
use crate::sheet::JsonLinesSheet;
use registry_types::ClinicCode;
use std::path::{Path, PathBuf};

/// Registry configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct RegistryConfig {
    data_dir: PathBuf,
    sheet_name: String,
    clinic_code: ClinicCode,
    date_locale: DateLocale,
}

impl RegistryConfig {
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidInput` if `sheet_name` is blank or could escape
    /// `data_dir`.
    pub fn new(
        data_dir: PathBuf,
        sheet_name: String,
        clinic_code: ClinicCode,
        date_locale: DateLocale,
    ) -> RegistryResult<Self> {
        let sheet_name = sheet_name.trim().to_string();
        if sheet_name.is_empty() {
            return Err(RegistryError::InvalidInput(
                "sheet_name cannot be empty".into(),
            ));
        }
        if sheet_name.contains(['/', '\\']) || sheet_name.starts_with('.') {
            return Err(RegistryError::InvalidInput(format!(
                "sheet_name must be a plain file stem: {sheet_name}"
            )));
        }

        Ok(Self {
            data_dir,
            sheet_name,
            clinic_code,
            date_locale,
        })
    }

    /// Builds a configuration from optional raw values, as read from the environment.
    ///
    /// Missing or blank values fall back to the defaults.
    pub fn from_env_values(
        data_dir: Option<String>,
        sheet_name: Option<String>,
        clinic_code: Option<String>,
        date_locale: Option<String>,
    ) -> RegistryResult<Self> {
        let data_dir = non_blank(data_dir).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        let sheet_name = non_blank(sheet_name).unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string());

        Self::new(
            PathBuf::from(data_dir),
            sheet_name,
            clinic_code_from_env_value(clinic_code)?,
            date_locale_from_env_value(date_locale)?,
        )
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn clinic_code(&self) -> &ClinicCode {
        &self.clinic_code
    }

    pub fn date_locale(&self) -> DateLocale {
        self.date_locale
    }

    /// The file-backed sheet this configuration points at.
    pub fn sheet(&self) -> JsonLinesSheet {
        JsonLinesSheet::new(&self.data_dir, self.sheet_name.clone())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses the clinic code, defaulting when absent.
pub fn clinic_code_from_env_value(value: Option<String>) -> RegistryResult<ClinicCode> {
    let value = non_blank(value).unwrap_or_else(|| DEFAULT_CLINIC_CODE.to_string());
    Ok(ClinicCode::new(value)?)
}

/// Parses the long-date locale, defaulting to Indonesian when absent.
pub fn date_locale_from_env_value(value: Option<String>) -> RegistryResult<DateLocale> {
    non_blank(value)
        .map(|v| v.parse::<DateLocale>().map_err(RegistryError::InvalidInput))
        .transpose()
        .map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = RegistryConfig::from_env_values(None, None, None, None).unwrap();

        assert_eq!(cfg.data_dir(), Path::new(DEFAULT_DATA_DIR));
        assert_eq!(cfg.sheet_name(), DEFAULT_SHEET_NAME);
        assert_eq!(cfg.clinic_code().as_str(), "KNP");
        assert_eq!(cfg.date_locale(), DateLocale::Indonesian);
        assert!(cfg.sheet().path().ends_with("letter_registry.jsonl"));
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let cfg = RegistryConfig::from_env_values(
            Some(" ".into()),
            Some("".into()),
            Some("  ".into()),
            Some("".into()),
        )
        .unwrap();

        assert_eq!(cfg.sheet_name(), DEFAULT_SHEET_NAME);
        assert_eq!(cfg.clinic_code().as_str(), "KNP");
    }

    #[test]
    fn test_explicit_values() {
        let cfg = RegistryConfig::from_env_values(
            Some("/srv/letters".into()),
            Some("archive_2025".into()),
            Some("abc1".into()),
            Some("en".into()),
        )
        .unwrap();

        assert_eq!(cfg.data_dir(), Path::new("/srv/letters"));
        assert_eq!(cfg.sheet_name(), "archive_2025");
        assert_eq!(cfg.clinic_code().as_str(), "ABC1");
        assert_eq!(cfg.date_locale(), DateLocale::English);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            RegistryConfig::from_env_values(None, None, Some("K/NP".into()), None),
            Err(RegistryError::Text(_))
        ));
        assert!(matches!(
            RegistryConfig::from_env_values(None, None, None, Some("fr".into())),
            Err(RegistryError::InvalidInput(_))
        ));
        assert!(matches!(
            RegistryConfig::from_env_values(None, Some("../escape".into()), None, None),
            Err(RegistryError::InvalidInput(_))
        ));
    }
}
