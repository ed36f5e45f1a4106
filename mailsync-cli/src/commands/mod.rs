pub mod diff;
pub mod keygen;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};

use mailsync_core::{config, Settings};

/// Resolve and load the settings file shared by every subcommand.
pub(crate) fn load_settings(explicit: Option<PathBuf>) -> Result<Settings> {
    let path = config::resolve_path(explicit)?;
    Settings::load(&path).with_context(|| format!("loading settings from {}", path.display()))
}
