//! Validated text types shared by the letter registry crates.
//!
//! These wrappers move input checks to construction time so that services never
//! see an empty patient name, a clinic code containing the letter-number
//! separator, or a lowercase letter-type code.

/// Separator between the segments of a letter number (`001/SKS/KNP/I/2025`).
pub const LETTER_NUMBER_SEPARATOR: char = '/';

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input contains the letter-number separator
    #[error("Text cannot contain '/': {0}")]
    ContainsSeparator(String),
    /// The input is not made of ASCII letters and digits
    #[error("Text must be ASCII alphanumeric: {0}")]
    NotAlphanumeric(String),
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Letter-type code as stored in the registry (`SKS`, `SR`, ...).
///
/// Codes are trimmed and uppercased. Codes that are not in the field catalog are
/// still valid here: the registry stores them verbatim and renders them as unknown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LetterTypeCode(String);

impl LetterTypeCode {
    /// # Errors
    ///
    /// Returns `TextError::Empty` for blank input and `TextError::ContainsSeparator`
    /// when the code would break the letter-number format.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        if trimmed.contains(LETTER_NUMBER_SEPARATOR) {
            return Err(TextError::ContainsSeparator(trimmed.to_owned()));
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Short clinic identifier embedded in every letter number.
///
/// Must be ASCII alphanumeric; stored uppercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicCode(String);

impl ClinicCode {
    /// # Errors
    ///
    /// Returns `TextError::Empty` for blank input and `TextError::NotAlphanumeric`
    /// if any character is not an ASCII letter or digit.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(TextError::NotAlphanumeric(trimmed.to_owned()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! impl_text_traits {
    ($ty:ident) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::str::FromStr for $ty {
            type Err = TextError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $ty::new(s)
            }
        }

        impl serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $ty::new(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

impl_text_traits!(NonEmptyText);
impl_text_traits!(LetterTypeCode);
impl_text_traits!(ClinicCode);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_text_trims() {
        let text = NonEmptyText::new("  Siti Aminah ").unwrap();
        assert_eq!(text.as_str(), "Siti Aminah");
    }

    #[test]
    fn test_non_empty_text_rejects_whitespace() {
        assert_eq!(NonEmptyText::new("   "), Err(TextError::Empty));
    }

    #[test]
    fn test_letter_type_code_uppercases() {
        let code = LetterTypeCode::new(" sks ").unwrap();
        assert_eq!(code.as_str(), "SKS");
    }

    #[test]
    fn test_letter_type_code_keeps_unknown_codes() {
        let code = LetterTypeCode::new("zzz").unwrap();
        assert_eq!(code.to_string(), "ZZZ");
    }

    #[test]
    fn test_letter_type_code_rejects_separator() {
        assert!(matches!(
            LetterTypeCode::new("SK/S"),
            Err(TextError::ContainsSeparator(_))
        ));
    }

    #[test]
    fn test_clinic_code_rejects_punctuation() {
        assert!(matches!(
            ClinicCode::new("K-NP"),
            Err(TextError::NotAlphanumeric(_))
        ));
        assert_eq!(ClinicCode::new("knp").unwrap().as_str(), "KNP");
    }

    #[test]
    fn test_deserialize_validates() {
        let err = serde_json::from_str::<NonEmptyText>("\"  \"");
        assert!(err.is_err());

        let code: LetterTypeCode = serde_json::from_str("\"skl\"").unwrap();
        assert_eq!(code.as_str(), "SKL");
    }
}
