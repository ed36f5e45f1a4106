//! Artifact kinds and their line renderers.
//!
//! # Formats (external contracts, reproduced byte for byte)
//!
//! | Kind             | Line format                                        |
//! |------------------|----------------------------------------------------|
//! | Passwd           | `email:password:uid:gid::mailDir::extra\n`         |
//! | Domains          | `domain\tdomain\n`                                 |
//! | DkimKeyTable     | `domain domain:mail:<keysDir>/<domain>.private\n`  |
//! | DkimSigningTable | `*@domain domain\n`                                |
//! | Recipients       | `email\temail\n`                                   |
//!
//! Rendering is pure and infallible: the same record set always produces
//! byte-identical output (which is what makes change detection downstream
//! sound), and invalid records are skipped, never errored; they were already
//! reported when normalization ran.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use mailsync_core::{AccountRecord, Normalized, Settings};

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// The closed set of artifacts one run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Passwd,
    Domains,
    DkimKeyTable,
    DkimSigningTable,
    Recipients,
}

/// What must happen after an artifact's content actually changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    /// No dependent action.
    None,
    /// Rebuild the lookup index over the written file.
    RebuildIndex,
    /// Restart the signing service. Shared across the DKIM pair and fired at
    /// most once per run.
    RestartDkim,
}

/// Everything a renderer may draw from, computed once per run.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub records: &'a [Normalized],
    pub domains: &'a BTreeSet<String>,
    pub dkim_keys_dir: &'a Path,
}

impl ArtifactKind {
    /// All kinds in cascade order: the credential file first (no index
    /// dependency), then the domain-derived artifacts, with the DKIM pair
    /// adjacent so their shared restart fires between them and the
    /// recipients step.
    pub fn all() -> &'static [ArtifactKind] {
        &[
            ArtifactKind::Passwd,
            ArtifactKind::Domains,
            ArtifactKind::DkimKeyTable,
            ArtifactKind::DkimSigningTable,
            ArtifactKind::Recipients,
        ]
    }

    /// Render this artifact's full content.
    pub fn render(&self, input: &RenderInput<'_>) -> String {
        match self {
            ArtifactKind::Passwd => render_passwd(input.records),
            ArtifactKind::Domains => render_domains(input.domains),
            ArtifactKind::DkimKeyTable => render_key_table(input.domains, input.dkim_keys_dir),
            ArtifactKind::DkimSigningTable => render_signing_table(input.domains),
            ArtifactKind::Recipients => render_recipients(input.records),
        }
    }

    /// Configured target path for this artifact.
    pub fn target_path(&self, settings: &Settings) -> PathBuf {
        match self {
            ArtifactKind::Passwd => settings.passwd_file.clone(),
            ArtifactKind::Domains => settings.domains_file.clone(),
            ArtifactKind::DkimKeyTable => settings.dkim_key_table.clone(),
            ArtifactKind::DkimSigningTable => settings.dkim_signing_table.clone(),
            ArtifactKind::Recipients => settings.recipients_file.clone(),
        }
    }

    pub fn side_effect(&self) -> SideEffect {
        match self {
            ArtifactKind::Passwd => SideEffect::None,
            ArtifactKind::Domains | ArtifactKind::Recipients => SideEffect::RebuildIndex,
            ArtifactKind::DkimKeyTable | ArtifactKind::DkimSigningTable => SideEffect::RestartDkim,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::Passwd => "passwd",
            ArtifactKind::Domains => "domains",
            ArtifactKind::DkimKeyTable => "dkim-key-table",
            ArtifactKind::DkimSigningTable => "dkim-signing-table",
            ArtifactKind::Recipients => "recipients",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Renderers
// ---------------------------------------------------------------------------

fn valid(records: &[Normalized]) -> impl Iterator<Item = &AccountRecord> {
    records.iter().filter_map(|normalized| normalized.as_ref().ok())
}

fn render_passwd(records: &[Normalized]) -> String {
    let mut out = String::new();
    for record in valid(records) {
        // The double `::` segments are consumed positionally by the delivery
        // agent; they are not separators between the visible fields.
        out.push_str(&format!(
            "{}:{}:{}:{}::{}::{}\n",
            record.email,
            record.password,
            record.uid,
            record.gid,
            record.mail_dir,
            record.extra_fields.as_deref().unwrap_or(""),
        ));
    }
    out
}

fn render_domains(domains: &BTreeSet<String>) -> String {
    let mut out = String::new();
    for domain in domains {
        out.push_str(&format!("{domain}\t{domain}\n"));
    }
    out
}

fn render_key_table(domains: &BTreeSet<String>, keys_dir: &Path) -> String {
    let mut out = String::new();
    for domain in domains {
        let key_path = keys_dir.join(format!("{domain}.private"));
        out.push_str(&format!("{domain} {domain}:mail:{}\n", key_path.display()));
    }
    out
}

fn render_signing_table(domains: &BTreeSet<String>) -> String {
    let mut out = String::new();
    for domain in domains {
        out.push_str(&format!("*@{domain} {domain}\n"));
    }
    out
}

fn render_recipients(records: &[Normalized]) -> String {
    let mut out = String::new();
    for record in valid(records) {
        out.push_str(&format!("{}\t{}\n", record.email, record.email));
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
