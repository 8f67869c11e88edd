use std::path::PathBuf;
use thiserror::Error;

/// The main error type for reconbridge operations.
///
/// Every variant aborts the parse that raised it; no partial reconstruction
/// is ever returned alongside an error.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File {path}; format is corrupted (expected '{expected}', found '{found}')")]
    Format {
        path: PathBuf,
        expected: &'static str,
        found: String,
    },

    #[error("Failed to parse {path} at line {line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Malformed metadata buffer: {message}")]
    MetaData { message: String },

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
