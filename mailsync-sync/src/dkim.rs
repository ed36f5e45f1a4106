//! DKIM key provisioning.
//!
//! The key table references `<keysDir>/<domain>.private`; this module makes
//! sure every derived domain actually has such a key, generating missing ones
//! through the [`MailOps`] seam.

use std::collections::BTreeSet;
use std::path::Path;

use crate::error::{io_err, SyncError};
use crate::ops::MailOps;

/// Generate a private key for every domain that has none yet.
///
/// Creates `keys_dir` (mode `0700`) if missing. Returns how many keys were
/// generated; a generation failure aborts, already-generated keys remain.
pub fn ensure_keys(
    domains: &BTreeSet<String>,
    keys_dir: &Path,
    ops: &dyn MailOps,
) -> Result<usize, SyncError> {
    if !keys_dir.exists() {
        std::fs::create_dir_all(keys_dir).map_err(|e| io_err(keys_dir, e))?;
        set_dir_permissions(keys_dir).map_err(|e| io_err(keys_dir, e))?;
    }

    let mut generated = 0;
    for domain in domains {
        let key_path = keys_dir.join(format!("{domain}.private"));
        if key_path.exists() {
            continue;
        }
        ops.generate_dkim_key(domain, keys_dir)?;
        tracing::info!("generated DKIM key for {domain}");
        generated += 1;
    }
    Ok(generated)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
}

#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
