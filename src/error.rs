//! Errors raised inside the persistence layer.
//!
//! These never cross the persistence boundary: the service converts them
//! into result records carrying `success: false` and the error's display
//! string.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode {what}: {source}")]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid panel id {0:?}: only ASCII letters, digits, '-' and '_' are allowed")]
    InvalidId(String),
    #[error("persistence worker is not running")]
    WorkerGone,
}

impl PersistError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        PersistError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type PersistResult<T> = Result<T, PersistError>;
