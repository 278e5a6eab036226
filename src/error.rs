use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to convert '{}': {message}", path.display())]
    Conversion { path: PathBuf, message: String },

    #[error("document converter '{program}' could not be started: {source}")]
    ConverterUnavailable {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("unsupported input file '{}'", path.display())]
    UnsupportedInput { path: PathBuf },

    #[error("no supported input files found under '{}'", path.display())]
    NoInputFiles { path: PathBuf },

    #[error("invalid option: {0}")]
    InvalidOption(String),
}

impl AuditError {
    pub(crate) fn conversion(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Conversion {
            path: path.into(),
            message: message.into(),
        }
    }
}
