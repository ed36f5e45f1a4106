//! Mailsync — reconcile mail-server configuration files against LDAP.
//!
//! # Usage
//!
//! ```text
//! mailsync sync [--dry-run] [--json] [--config <path>]
//! mailsync diff [--config <path>]
//! mailsync keygen [--config <path>]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{diff::DiffArgs, keygen::KeygenArgs, sync::SyncArgs};

#[derive(Parser, Debug)]
#[command(
    name = "mailsync",
    version,
    about = "Reconcile mail-server configuration files against an LDAP directory",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render every artifact, write the changed ones, and trigger the
    /// dependent index rebuilds and service restart.
    Sync(SyncArgs),

    /// Show unified diffs of what sync would write. Writes nothing.
    Diff(DiffArgs),

    /// Generate missing DKIM private keys for the derived domains.
    Keygen(KeygenArgs),
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Diff(args) => args.run(),
        Commands::Keygen(args) => args.run(),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
