use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from everything outside the renderer, which cannot fail.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("text generation failed: {0}")]
    Generation(String),

    #[error("invalid budget suggestion: {0}")]
    InvalidSuggestion(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// I/O failure on `path`.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
