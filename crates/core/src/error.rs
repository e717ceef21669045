use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid text: {0}")]
    Text(#[from] registry_types::TextError),
    #[error("invalid action: {0}")]
    UnknownAction(String),
    #[error("invalid payload: {0}")]
    Payload(serde_json::Error),
    #[error("invalid letter date '{value}': expected YYYY-MM-DD")]
    InvalidLetterDate { value: String },

    #[error("invalid field catalog: {0}")]
    Catalog(String),

    #[error("failed to create sheet directory: {0}")]
    SheetDirCreation(std::io::Error),
    #[error("failed to read sheet: {0}")]
    SheetRead(std::io::Error),
    #[error("failed to write sheet: {0}")]
    SheetWrite(std::io::Error),
    #[error(
        "sheet file is corrupt (path: {path}, line {line}): {source}",
        path = path.display()
    )]
    SheetCorrupt {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("sheet does not exist: {0}")]
    SheetMissing(String),
    #[error("row width {actual} does not match header width {expected}")]
    RowWidth { expected: usize, actual: usize },
    #[error("failed to serialise row: {0}")]
    Serialization(serde_json::Error),

    #[error("registry store lock poisoned")]
    LockPoisoned,
}

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
