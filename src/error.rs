//! Error types for loading, configuration and report output.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortfolioError {
    /// File could not be opened, read or written
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// CSV reader or writer failed outside of per-row deserialization
    #[error("CSV error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// Config file is not valid TOML for `AppConfig`
    #[error("Config parse error in {path}: {message}")]
    ConfigParse { path: String, message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

pub type PortfolioResult<T> = Result<T, PortfolioError>;
