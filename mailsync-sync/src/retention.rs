//! Snapshot retention sweeping.
//!
//! Best-effort cleanup of `<artifact>_<timestamp>` backups: anything older
//! than the retention threshold goes, anything unreadable is skipped. A sweep
//! can never fail a run.

use std::path::Path;
use std::time::{Duration, SystemTime};

/// Delete snapshots of `artifact` older than `max_age_hours`.
///
/// Matches sibling files named `<artifact file name>_*`. Returns how many
/// files were removed.
pub fn sweep_snapshots(artifact: &Path, max_age_hours: u64) -> usize {
    let Some(parent) = artifact.parent() else {
        return 0;
    };
    let Some(file_name) = artifact.file_name().and_then(|n| n.to_str()) else {
        return 0;
    };
    let prefix = format!("{file_name}_");

    let entries = match std::fs::read_dir(parent) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::debug!("retention sweep skipped {}: {err}", parent.display());
            return 0;
        }
    };

    let cutoff = SystemTime::now() - Duration::from_secs(max_age_hours * 60 * 60);
    let mut removed = 0;

    for entry in entries.filter_map(Result::ok) {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.starts_with(&prefix) {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        let Ok(modified) = metadata.modified() else {
            continue;
        };
        if modified >= cutoff {
            continue;
        }

        let path = entry.path();
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("swept snapshot {}", path.display());
                removed += 1;
            }
            Err(err) => tracing::warn!("could not sweep {}: {err}", path.display()),
        }
    }

    removed
}
