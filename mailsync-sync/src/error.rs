//! Error types for mailsync-sync.

use std::path::PathBuf;

use thiserror::Error;

use mailsync_core::SourceError;

use crate::ops::OpError;

/// All errors that can abort a synchronization run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The directory source could not be queried; nothing was written.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// An external operation (index rebuild, service restart, key
    /// generation) failed; the on-disk artifacts and the live service may
    /// now disagree.
    #[error(transparent)]
    Op(#[from] OpError),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
