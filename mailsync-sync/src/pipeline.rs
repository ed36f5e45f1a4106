//! The cascade: render → compare-write → conditional side effects → sweep.
//!
//! One pass over the fixed artifact order per run. Invalid records are the
//! only locally-recovered failure; everything else aborts immediately,
//! leaving already-written artifacts in place (each is independently
//! consistent). The DKIM pair shares one restart trigger, deduplicated so the
//! service restarts at most once per run and only after both tables are
//! final.

use std::path::PathBuf;

use serde::Serialize;

use mailsync_core::{record, DirectorySource, Normalized, RawRecord, Settings};
use mailsync_render::{ArtifactKind, RenderInput, SideEffect};

use crate::error::SyncError;
use crate::ops::MailOps;
use crate::retention;
use crate::writer::{self, WriteResult};

/// Per-artifact result of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactOutcome {
    pub kind: ArtifactKind,
    #[serde(flatten)]
    pub result: WriteResult,
}

/// Summary of a full synchronization run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub outcomes: Vec<ArtifactOutcome>,
    /// Raw records excluded by validation (logged, not fatal).
    pub invalid_records: usize,
    /// Paths whose lookup index was rebuilt.
    pub rebuilt_indexes: Vec<PathBuf>,
    /// Whether the shared DKIM restart fired.
    pub dkim_restarted: bool,
    /// Snapshot files deleted by retention sweeps.
    pub swept_snapshots: usize,
    pub dry_run: bool,
}

/// Fetch from the directory source, then run the cascade.
///
/// A source failure aborts before any artifact is touched.
pub fn run_with_source(
    settings: &Settings,
    source: &mut dyn DirectorySource,
    ops: &dyn MailOps,
    dry_run: bool,
) -> Result<RunReport, SyncError> {
    let raw_records = source.fetch()?;
    tracing::debug!("fetched {} directory records", raw_records.len());
    run(settings, &raw_records, ops, dry_run)
}

/// Run the cascade over an already-materialized record sequence.
pub fn run(
    settings: &Settings,
    raw_records: &[RawRecord],
    ops: &dyn MailOps,
    dry_run: bool,
) -> Result<RunReport, SyncError> {
    let normalized: Vec<Normalized> = raw_records.iter().map(record::normalize).collect();
    let invalid_records = normalized.iter().filter(|n| n.is_err()).count();
    for invalid in normalized.iter().filter_map(|n| n.as_ref().err()) {
        tracing::warn!("skipping {invalid}");
    }

    let domains = record::domain_set(&normalized);
    let input = RenderInput {
        records: &normalized,
        domains: &domains,
        dkim_keys_dir: &settings.dkim_keys_dir,
    };

    let plan = ArtifactKind::all();
    let last_dkim = plan
        .iter()
        .rposition(|kind| kind.side_effect() == SideEffect::RestartDkim);

    let mut outcomes = Vec::with_capacity(plan.len());
    let mut rebuilt_indexes = Vec::new();
    let mut restart_pending = false;
    let mut dkim_restarted = false;

    for (index, kind) in plan.iter().enumerate() {
        let content = kind.render(&input);
        let path = kind.target_path(settings);
        let result = writer::write_if_changed(&path, content.as_bytes(), dry_run)?;

        if result.is_written() {
            match kind.side_effect() {
                SideEffect::RebuildIndex => {
                    ops.rebuild_index(&path)?;
                    tracing::info!("rebuilt index for {}", path.display());
                    rebuilt_indexes.push(path.clone());
                }
                SideEffect::RestartDkim => restart_pending = true,
                SideEffect::None => {}
            }
        }

        // Deferred until the last DKIM table is final, so the service never
        // reloads a half-updated pair; fired here (not at run end) so a
        // restart failure halts the cascade before the remaining artifacts.
        if restart_pending && Some(index) == last_dkim {
            ops.restart_dkim()?;
            tracing::info!("restarted DKIM signing service");
            dkim_restarted = true;
            restart_pending = false;
        }

        outcomes.push(ArtifactOutcome {
            kind: *kind,
            result,
        });
    }

    let mut swept_snapshots = 0;
    if !dry_run {
        for outcome in &outcomes {
            if outcome.result.is_written() {
                swept_snapshots += retention::sweep_snapshots(
                    outcome.result.path(),
                    settings.snapshot_retention_hours,
                );
            }
        }
    }

    Ok(RunReport {
        outcomes,
        invalid_records,
        rebuilt_indexes,
        dkim_restarted,
        swept_snapshots,
        dry_run,
    })
}
