//! `mailsync sync` — run the full artifact cascade.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use mailsync_ldap::LdapDirectory;
use mailsync_sync::{pipeline, RunReport, SystemOps, WriteResult};

/// Arguments for `mailsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Settings file (default: ./mailsync.yaml, then ~/.config/mailsync/mailsync.yaml).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Show what would change without writing files or triggering commands.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the run report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let settings = super::load_settings(self.config)?;

        let mut source = LdapDirectory::new(settings.ldap.clone());
        let ops = SystemOps::from_settings(&settings);
        let report = pipeline::run_with_source(&settings, &mut source, &ops, self.dry_run)
            .context("synchronization failed")?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
        }
        Ok(())
    }
}

fn print_report(report: &RunReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    let written = report
        .outcomes
        .iter()
        .filter(|o| {
            matches!(
                o.result,
                WriteResult::Written { .. } | WriteResult::WouldWrite { .. }
            )
        })
        .count();
    let unchanged = report.outcomes.len() - written;

    println!("{prefix}✓ synced ({written} written, {unchanged} unchanged)");

    for outcome in &report.outcomes {
        match &outcome.result {
            WriteResult::Written { path, .. } => {
                println!("  {}  {} ({})", "✎".green(), path.display(), outcome.kind);
            }
            WriteResult::WouldWrite { path } => {
                println!("  {}  {} ({})", "~".yellow(), path.display(), outcome.kind);
            }
            WriteResult::Unchanged { path } => {
                println!("  ·  {} ({})", path.display(), outcome.kind);
            }
        }
    }

    if report.invalid_records > 0 {
        println!(
            "  {}  {} record(s) failed validation and were skipped",
            "!".red(),
            report.invalid_records
        );
    }
    for path in &report.rebuilt_indexes {
        println!("  ↻  rebuilt index for {}", path.display());
    }
    if report.dkim_restarted {
        println!("  ↻  restarted DKIM signing service");
    }
    if report.swept_snapshots > 0 {
        println!("  ✂  swept {} expired snapshot(s)", report.swept_snapshots);
    }
}
