//! External operations behind the [`MailOps`] seam.
//!
//! The cascade only ever talks to this trait, so its gating logic is testable
//! without spawning processes. [`SystemOps`] is the production implementation
//! shelling out to postmap, the service manager, and the DKIM key generator.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use mailsync_core::Settings;

/// Failure of an external command.
#[derive(Debug, Error)]
pub enum OpError {
    /// The command could not be spawned at all.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran but exited unsuccessfully.
    #[error("`{command}` failed: {detail}")]
    Failed { command: String, detail: String },
}

/// Side-effect operations the cascade may trigger.
pub trait MailOps {
    /// Rebuild the lookup index derived from `table`.
    fn rebuild_index(&self, table: &Path) -> Result<(), OpError>;

    /// Restart the DKIM signing service.
    fn restart_dkim(&self) -> Result<(), OpError>;

    /// Generate a private key for `domain` under `keys_dir`.
    fn generate_dkim_key(&self, domain: &str, keys_dir: &Path) -> Result<(), OpError>;
}

/// Production operations: blocking process invocations, no retries.
#[derive(Debug, Clone)]
pub struct SystemOps {
    postmap_bin: PathBuf,
    service_bin: PathBuf,
    dkim_service: String,
    genkey_bin: PathBuf,
}

impl SystemOps {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            postmap_bin: settings.postmap_bin.clone(),
            service_bin: settings.service_bin.clone(),
            dkim_service: settings.dkim_service.clone(),
            genkey_bin: settings.genkey_bin.clone(),
        }
    }
}

impl MailOps for SystemOps {
    fn rebuild_index(&self, table: &Path) -> Result<(), OpError> {
        run_checked(&self.postmap_bin, &[format!("hash:{}", table.display())])
    }

    fn restart_dkim(&self) -> Result<(), OpError> {
        run_checked(
            &self.service_bin,
            &[self.dkim_service.clone(), "restart".to_owned()],
        )
    }

    fn generate_dkim_key(&self, domain: &str, keys_dir: &Path) -> Result<(), OpError> {
        // Selector = domain, so the generated file is `<domain>.private`,
        // matching the key table entries.
        run_checked(
            &self.genkey_bin,
            &[
                "-D".to_owned(),
                keys_dir.display().to_string(),
                "-d".to_owned(),
                domain.to_owned(),
                "-s".to_owned(),
                domain.to_owned(),
            ],
        )
    }
}

/// Run a command to completion; fold combined output into the error on a
/// nonzero exit.
fn run_checked(bin: &Path, args: &[String]) -> Result<(), OpError> {
    let command = format!("{} {}", bin.display(), args.join(" "));
    tracing::debug!("running {command}");

    let output = Command::new(bin)
        .args(args)
        .output()
        .map_err(|source| OpError::Spawn {
            command: command.clone(),
            source,
        })?;

    if output.status.success() {
        return Ok(());
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
    Err(OpError::Failed {
        command,
        detail: format!("status {}: {} {}", output.status, stdout, stderr),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops_with_missing_binaries() -> SystemOps {
        SystemOps {
            postmap_bin: PathBuf::from("/nonexistent/postmap"),
            service_bin: PathBuf::from("/nonexistent/service"),
            dkim_service: "opendkim".to_owned(),
            genkey_bin: PathBuf::from("/nonexistent/opendkim-genkey"),
        }
    }

    #[test]
    fn missing_binary_is_a_spawn_error() {
        let ops = ops_with_missing_binaries();
        let err = ops
            .rebuild_index(Path::new("/etc/postfix/virtual_domains"))
            .unwrap_err();
        match err {
            OpError::Spawn { command, .. } => {
                assert!(command.contains("hash:/etc/postfix/virtual_domains"));
            }
            other => panic!("expected spawn error, got {other:?}"),
        }
    }

    #[test]
    fn restart_command_names_the_service() {
        let ops = ops_with_missing_binaries();
        let err = ops.restart_dkim().unwrap_err();
        assert!(err.to_string().contains("opendkim restart"));
    }

    #[test]
    fn genkey_uses_domain_as_selector() {
        let ops = ops_with_missing_binaries();
        let err = ops
            .generate_dkim_key("example.com", Path::new("/etc/opendkim/keys"))
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("-d example.com"));
        assert!(text.contains("-s example.com"));
        assert!(text.contains("-D /etc/opendkim/keys"));
    }

    #[test]
    fn failed_error_display_includes_detail() {
        let err = OpError::Failed {
            command: "postmap hash:/tmp/x".to_owned(),
            detail: "status 1: fatal".to_owned(),
        };
        let text = err.to_string();
        assert!(text.contains("postmap hash:/tmp/x"));
        assert!(text.contains("status 1: fatal"));
    }
}
