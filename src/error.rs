//! Error handling for the S7COMM trace tool
//!
//! Configuration and external-tool failures are fatal and stop the run;
//! resolution misses and payload decode failures are absorbed per frame by
//! the correlation engine and surface as "Unknown" fields in the output.

use thiserror::Error;

/// S7COMM trace tool error type
#[derive(Error, Debug)]
pub enum S7TraceError {
    /// Malformed or incomplete mapping document
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Malformed hex payload, undersized payload for the declared type, or
    /// an out-of-range bit index
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// External capture decoder or annotation utility failure
    #[error("External tool error: {0}")]
    ExternalTool(String),

    /// Input/Output operation errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Tabular export errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for trace tool operations
pub type Result<T> = std::result::Result<T, S7TraceError>;
