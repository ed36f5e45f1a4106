//! YAML settings for a synchronization run.
//!
//! Settings are loaded once at startup into an immutable [`Settings`] value
//! and passed into the pipeline by reference; nothing mutates them afterwards.
//!
//! # Resolution order
//!
//! 1. explicit `--config` path (must exist)
//! 2. `./mailsync.yaml`
//! 3. `~/.config/mailsync/mailsync.yaml`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Directory connection parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LdapSettings {
    pub host: String,
    #[serde(default = "default_ldap_port")]
    pub port: u16,
    pub bind_dn: String,
    pub password: String,
    pub base_dn: String,
    pub filter: String,
}

/// Immutable run configuration: directory access, artifact targets, external
/// command locations, snapshot retention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub ldap: LdapSettings,

    /// Credential artifact consumed by the mail delivery agent.
    pub passwd_file: PathBuf,
    /// Virtual domain list artifact.
    pub domains_file: PathBuf,
    /// Virtual recipient list artifact.
    pub recipients_file: PathBuf,
    /// DKIM key table artifact.
    pub dkim_key_table: PathBuf,
    /// DKIM signing table artifact.
    pub dkim_signing_table: PathBuf,
    /// Directory holding per-domain private keys.
    pub dkim_keys_dir: PathBuf,

    #[serde(default = "default_postmap_bin")]
    pub postmap_bin: PathBuf,
    #[serde(default = "default_service_bin")]
    pub service_bin: PathBuf,
    #[serde(default = "default_dkim_service")]
    pub dkim_service: String,
    #[serde(default = "default_genkey_bin")]
    pub genkey_bin: PathBuf,

    /// Snapshots older than this many hours are swept after a write.
    #[serde(default = "default_retention_hours")]
    pub snapshot_retention_hours: u64,
}

fn default_ldap_port() -> u16 {
    389
}
fn default_postmap_bin() -> PathBuf {
    PathBuf::from("/usr/sbin/postmap")
}
fn default_service_bin() -> PathBuf {
    PathBuf::from("/usr/sbin/service")
}
fn default_dkim_service() -> String {
    "opendkim".to_owned()
}
fn default_genkey_bin() -> PathBuf {
    PathBuf::from("opendkim-genkey")
}
fn default_retention_hours() -> u64 {
    48
}

impl Settings {
    /// Load settings from `path`.
    ///
    /// Returns `ConfigError::NotFound` if absent, `ConfigError::Parse` (with
    /// path + line context) if malformed YAML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Resolve the settings file location (see module docs for the order).
pub fn resolve_path(explicit: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    resolve_path_at(explicit, Path::new("."), dirs::home_dir().as_deref())
}

/// `resolve_path` with explicit working directory and home; used in tests.
pub fn resolve_path_at(
    explicit: Option<PathBuf>,
    cwd: &Path,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::NotFound { path });
    }

    let local = cwd.join("mailsync.yaml");
    if local.exists() {
        return Ok(local);
    }

    if let Some(home) = home {
        let fallback = home.join(".config").join("mailsync").join("mailsync.yaml");
        if fallback.exists() {
            return Ok(fallback);
        }
    }

    Err(ConfigError::NoDefault)
}
