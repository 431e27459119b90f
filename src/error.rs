//! Error types for synthkit operations.
//!
//! Defines error types for the major subsystems:
//! - Document loading (text files, Parquet datasets)
//! - LLM API interactions and batch dispatch
//! - Generation pipeline assembly
//! - Output export

use thiserror::Error;

/// Errors that can occur while loading source documents.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Unsupported input extension '{extension}': expected .txt or .parquet")]
    UnsupportedExtension { extension: String },

    #[error("Input file not found: {0}")]
    FileNotFound(String),

    #[error("Parquet file must contain a 'text' column. Available columns: {}", available.join(", "))]
    MissingColumn { available: Vec<String> },

    #[error("Failed to read Parquet file '{path}': {message}")]
    ParquetRead { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing API base URL: SYNTHKIT_API_BASE environment variable not set")]
    MissingApiBase,

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse LLM response: {0}")]
    ParseError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Empty completion: the API returned no choices")]
    EmptyCompletion,

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while assembling a generation run.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("No prompt template named '{0}' in configuration or defaults")]
    PromptNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while writing generated output.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No records to write")]
    NoRecords,

    #[error("Failed to serialize output: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to write Parquet output '{path}': {message}")]
    ParquetWrite { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
