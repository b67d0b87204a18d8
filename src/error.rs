//! Error types

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Invalid or incomplete configuration. Raised before any markup is parsed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("blueprint entry '{key}' has no selector")]
    MissingSelector { key: String },

    #[error("blueprint entry '{key}' has an invalid selector '{selector}': {reason}")]
    InvalidSelector {
        key: String,
        selector: String,
        reason: String,
    },

    #[error("blueprint entry '{key}' lists attribute '{attribute}' more than once")]
    DuplicateAttribute { key: String, attribute: String },

    #[error("plugin '{name}' was used before configure()")]
    NotConfigured { name: String },

    #[error("invalid file pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("malformed blueprint: {0}")]
    Blueprint(#[source] serde_json::Error),

    #[error("configuration error: {0}")]
    Figment(#[from] figment::Error),
}

/// Markup that cannot be turned into a queryable tree.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("markup is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no file matching '{pattern}' in {}", dir.display())]
    InputNotFound { pattern: String, dir: PathBuf },

    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
