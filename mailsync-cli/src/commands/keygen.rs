//! `mailsync keygen` — provision missing DKIM private keys.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use mailsync_core::{record, DirectorySource, Normalized};
use mailsync_ldap::LdapDirectory;
use mailsync_sync::{ensure_keys, SystemOps};

/// Arguments for `mailsync keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Settings file (default: ./mailsync.yaml, then ~/.config/mailsync/mailsync.yaml).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl KeygenArgs {
    pub fn run(self) -> Result<()> {
        let settings = super::load_settings(self.config)?;

        let mut source = LdapDirectory::new(settings.ldap.clone());
        let raw_records = source.fetch().context("directory query failed")?;
        let normalized: Vec<Normalized> = raw_records.iter().map(record::normalize).collect();
        let domains = record::domain_set(&normalized);

        let ops = SystemOps::from_settings(&settings);
        let generated = ensure_keys(&domains, &settings.dkim_keys_dir, &ops)
            .context("DKIM key generation failed")?;

        if generated == 0 {
            println!("All {} domain(s) already have keys.", domains.len());
        } else {
            println!("Generated {generated} key(s) for {} domain(s).", domains.len());
        }
        Ok(())
    }
}
