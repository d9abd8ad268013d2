use std::{io, path::PathBuf};

use thiserror::Error;

use crate::models::LineError;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failure of the durable log. Never retried inside the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corrupt record at {path}:{line}: {reason}")]
    Corrupt {
        path: PathBuf,
        line: usize,
        #[source]
        reason: LineError,
    },

    #[error("record cannot be stored: {0}")]
    Unencodable(#[source] LineError),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| StoreError::Io { path, source }
    }
}
