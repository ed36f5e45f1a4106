//! Error types for mailsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse error on load — includes file path and line context from serde_yaml.
    #[error("failed to parse settings at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The settings file did not exist at the expected path.
    #[error("settings file not found at {path}")]
    NotFound { path: PathBuf },

    /// No settings file at any default location and none given explicitly.
    #[error("no settings file found; looked for ./mailsync.yaml and ~/.config/mailsync/mailsync.yaml")]
    NoDefault,
}
