use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CccError {
    /// The rule set, the qualification table and the statement columns are out of sync.
    #[error("Configuration mismatch: {0}")]
    ConfigurationMismatch(String),

    #[error("Cannot parse {field} value '{value}' as {expected}")]
    ValueParsing {
        field: String,
        value: String,
        expected: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Config file error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No statement matching '{pattern}' in {}", dir.display())]
    NoStatement { dir: PathBuf, pattern: String },

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("{0}")]
    Other(String),
}

impl CccError {
    pub fn value_parsing(field: &str, value: impl ToString, expected: &str) -> Self {
        Self::ValueParsing {
            field: field.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CccError>;
