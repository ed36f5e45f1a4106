//! Unified diff of what a sync would write, without writing.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use similar::TextDiff;

use mailsync_core::{record, Normalized, RawRecord, Settings};
use mailsync_render::{ArtifactKind, RenderInput};

use crate::error::{io_err, SyncError};

/// A single artifact diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Render every artifact from `raw_records` and compare it to current on-disk
/// content. No files are written; unchanged artifacts produce no entry.
pub fn diff_artifacts(
    settings: &Settings,
    raw_records: &[RawRecord],
) -> Result<Vec<FileDiff>, SyncError> {
    let normalized: Vec<Normalized> = raw_records.iter().map(record::normalize).collect();
    let domains = record::domain_set(&normalized);
    let input = RenderInput {
        records: &normalized,
        domains: &domains,
        dkim_keys_dir: &settings.dkim_keys_dir,
    };

    let mut diffs = Vec::new();
    for kind in ArtifactKind::all() {
        let rendered = kind.render(&input);
        let path = kind.target_path(settings);
        let existing = read_existing_or_empty(&path)?;
        if existing == rendered {
            continue;
        }

        let old_header = format!("a/{}", path.display());
        let new_header = format!("b/{}", path.display());
        let unified = TextDiff::from_lines(&existing, &rendered)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string();

        diffs.push(FileDiff {
            kind: *kind,
            path,
            unified_diff: unified,
        });
    }

    Ok(diffs)
}

fn read_existing_or_empty(path: &Path) -> Result<String, SyncError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(io_err(path, err)),
    }
}
