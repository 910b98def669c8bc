//! Error types for the article filter.
//!
//! The SQLite helper does not wrap engine errors; it returns
//! `rusqlite::Error` as-is.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop an article filter run.
#[derive(Debug, Error)]
pub enum FilterError {
    /// A required environment variable is absent.
    #[error("Environment variable '{name}' is not set")]
    MissingEnvVar { name: String },

    /// A required environment variable is set but is not valid Unicode.
    #[error("Environment variable '{name}' is not valid Unicode")]
    InvalidEnvVar { name: String },

    /// Figment extraction failed.
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    /// The article list could not be read.
    #[error("Failed to read article list '{}': {source}", path.display())]
    ReadArticles {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
