//! `mailsync diff` — unified diffs of what sync would write.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use mailsync_core::DirectorySource;
use mailsync_ldap::LdapDirectory;
use mailsync_sync::diff_artifacts;

/// Arguments for `mailsync diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Settings file (default: ./mailsync.yaml, then ~/.config/mailsync/mailsync.yaml).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let settings = super::load_settings(self.config)?;

        let mut source = LdapDirectory::new(settings.ldap.clone());
        let raw_records = source.fetch().context("directory query failed")?;

        let diffs = diff_artifacts(&settings, &raw_records)?;
        if diffs.is_empty() {
            println!("No differences.");
            return Ok(());
        }

        for diff in diffs {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }
        Ok(())
    }
}
