//! Error types for the event-study engine.

use thiserror::Error;

/// Main error type for the event-study engine.
#[derive(Error, Debug)]
pub enum EventStudyError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Date parsing error: {0}")]
    DateParseError(#[from] chrono::ParseError),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Unknown group '{0}': expected Beat, Meet or Miss")]
    UnknownGroup(String),

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("No stocks loaded")]
    NoData,

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for event-study operations.
pub type Result<T> = std::result::Result<T, EventStudyError>;
