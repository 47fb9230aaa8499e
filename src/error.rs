use std::path::PathBuf;
use thiserror::Error;

/// Failures reported by [`crate::store::ProfileStore`]
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Environment '{0}' already exists")]
    DuplicateName(String),

    #[error("Environment '{0}' not found")]
    NotFound(String),

    #[error("Failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path:?}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the failure came from user input rather than the storage layer.
    ///
    /// User errors leave the persisted documents untouched.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::DuplicateName(_) | Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
