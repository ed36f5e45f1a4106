//! Change-aware atomic writer.
//!
//! ## `write_if_changed` protocol
//!
//! 1. Read the current artifact content (missing file = no prior content).
//! 2. Byte-compare with the candidate → skip if identical.
//! 3. Write the candidate to `<path>.mailsync.tmp`, mode `0400`.
//! 4. Rename to the final path (atomic on POSIX).
//! 5. Persist the prior content to `<path>_<YYYYMMDD-HHMMSS>`, best-effort.
//!
//! The rename is the durable operation of record; a snapshot failure is
//! logged and reported but never propagated.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{io_err, SyncError};

/// Outcome of an individual artifact write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WriteResult {
    /// Content changed; the artifact was replaced. `snapshot` is the backup
    /// of the prior content, `None` if the backup copy failed.
    Written {
        path: PathBuf,
        snapshot: Option<PathBuf>,
    },
    /// Candidate content byte-equals what is already on disk.
    Unchanged { path: PathBuf },
    /// Dry-run mode: the artifact *would* have been replaced.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path, .. }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }

    /// True only for an actual on-disk replacement.
    pub fn is_written(&self) -> bool {
        matches!(self, WriteResult::Written { .. })
    }
}

/// Compare-then-replace a single artifact.
///
/// Idempotent: an immediately repeated call with the same content touches
/// nothing beyond the comparison read.
pub fn write_if_changed(
    path: &Path,
    content: &[u8],
    dry_run: bool,
) -> Result<WriteResult, SyncError> {
    let tmp = PathBuf::from(format!("{}.mailsync.tmp", path.display()));
    write_if_changed_with_tmp(path, content, dry_run, &tmp)
}

fn write_if_changed_with_tmp(
    path: &Path,
    content: &[u8],
    dry_run: bool,
    tmp: &Path,
) -> Result<WriteResult, SyncError> {
    let prior = match std::fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(err) if err.kind() == ErrorKind::NotFound => None,
        Err(err) => return Err(io_err(path, err)),
    };

    if prior.as_deref() == Some(content) {
        tracing::debug!("unchanged: {}", path.display());
        return Ok(WriteResult::Unchanged {
            path: path.to_path_buf(),
        });
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;
    // Artifacts carry credential material: owner-read-only before the file
    // becomes visible under its final name.
    set_file_permissions(tmp).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    let snapshot = store_snapshot(path, prior.unwrap_or_default().as_slice(), Utc::now());

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
        snapshot,
    })
}

/// `<path>_<YYYYMMDD-HHMMSS>` — sortable capture timestamp.
pub(crate) fn snapshot_path(path: &Path, at: DateTime<Utc>) -> PathBuf {
    PathBuf::from(format!("{}_{}", path.display(), at.format("%Y%m%d-%H%M%S")))
}

/// Best-effort backup of the replaced content. A first-time write snapshots
/// the empty prior content, so every replacement leaves exactly one snapshot.
fn store_snapshot(path: &Path, prior: &[u8], at: DateTime<Utc>) -> Option<PathBuf> {
    let snapshot = snapshot_path(path, at);
    if let Err(err) = std::fs::write(&snapshot, prior) {
        tracing::warn!("snapshot of {} failed: {err}", path.display());
        return None;
    }
    if let Err(err) = set_file_permissions(&snapshot) {
        tracing::warn!("could not restrict {}: {err}", snapshot.display());
    }
    Some(snapshot)
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o400))
}

#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn snapshots_of(dir: &Path, file_name: &str) -> Vec<PathBuf> {
        let prefix = format!("{file_name}_");
        let mut found: Vec<PathBuf> = fs::read_dir(dir)
            .expect("read dir")
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix))
            })
            .collect();
        found.sort();
        found
    }

    #[test]
    fn first_write_creates_file_and_one_snapshot_of_empty_prior() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("passwd");

        let result = write_if_changed(&path, b"A", false).expect("write");
        assert!(result.is_written());
        assert_eq!(fs::read(&path).expect("read"), b"A");

        let snapshots = snapshots_of(tmp.path(), "passwd");
        assert_eq!(snapshots.len(), 1);
        assert_eq!(fs::read(&snapshots[0]).expect("read snapshot"), b"");
    }

    #[test]
    fn repeated_content_is_unchanged_and_adds_no_snapshot() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("passwd");

        write_if_changed(&path, b"A", false).expect("first");
        let second = write_if_changed(&path, b"A", false).expect("second");
        assert!(matches!(second, WriteResult::Unchanged { .. }));
        assert_eq!(snapshots_of(tmp.path(), "passwd").len(), 1);
    }

    #[test]
    fn unchanged_write_preserves_mtime() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("passwd");

        write_if_changed(&path, b"A", false).expect("first");
        let mtime_1 = fs::metadata(&path).expect("meta").modified().expect("mtime");

        std::thread::sleep(std::time::Duration::from_millis(1100));
        write_if_changed(&path, b"A", false).expect("second");
        let mtime_2 = fs::metadata(&path).expect("meta").modified().expect("mtime");

        assert_eq!(mtime_1, mtime_2, "no-op write must not rewrite the file");
    }

    #[test]
    fn changed_content_snapshots_the_prior_bytes() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("passwd");

        write_if_changed(&path, b"A", false).expect("first");
        let result = write_if_changed(&path, b"B", false).expect("second");

        let WriteResult::Written { snapshot, .. } = result else {
            panic!("expected written");
        };
        let snapshot = snapshot.expect("snapshot path");
        assert_eq!(fs::read(&path).expect("read"), b"B");
        assert_eq!(fs::read(&snapshot).expect("read snapshot"), b"A");
    }

    #[test]
    fn dry_run_reports_would_write_and_touches_nothing() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("passwd");

        let result = write_if_changed(&path, b"A", true).expect("dry run");
        assert!(matches!(result, WriteResult::WouldWrite { .. }));
        assert!(!path.exists());
        assert!(snapshots_of(tmp.path(), "passwd").is_empty());
    }

    #[test]
    fn tmp_file_removed_after_write() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("passwd");
        write_if_changed(&path, b"A", false).expect("write");
        let tmp_path = PathBuf::from(format!("{}.mailsync.tmp", path.display()));
        assert!(!tmp_path.exists(), ".mailsync.tmp must be cleaned up");
    }

    #[test]
    #[cfg(unix)]
    fn artifact_mode_is_owner_read_only() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("passwd");
        write_if_changed(&path, b"A", false).expect("write");

        let mode = fs::metadata(&path).expect("meta").permissions().mode() & 0o777;
        assert_eq!(mode, 0o400);
    }

    #[test]
    fn snapshot_name_is_sortable_timestamp_suffix() {
        let at = DateTime::parse_from_rfc3339("2026-03-01T04:05:06Z")
            .expect("timestamp")
            .with_timezone(&Utc);
        let snapshot = snapshot_path(Path::new("/etc/dovecot/passwd"), at);
        assert_eq!(
            snapshot,
            PathBuf::from("/etc/dovecot/passwd_20260301-040506")
        );
    }

    #[test]
    #[cfg(unix)]
    fn rename_failure_leaves_original_and_cleans_tmp() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().expect("tempdir");
        let readonly_dir = root.path().join("readonly");
        fs::create_dir_all(&readonly_dir).expect("mkdir");

        let path = readonly_dir.join("passwd");
        fs::write(&path, b"original").expect("seed");

        let mut perms = fs::metadata(&readonly_dir).expect("meta").permissions();
        perms.set_mode(0o555);
        fs::set_permissions(&readonly_dir, perms).expect("chmod");

        let tmp_dir = TempDir::new().expect("tmp dir");
        let tmp_path = tmp_dir.path().join("passwd.mailsync.tmp");

        let err = write_if_changed_with_tmp(&path, b"replacement", false, &tmp_path)
            .expect_err("rename should fail on readonly dir");
        assert!(matches!(err, SyncError::Io { .. }));

        assert_eq!(fs::read(&path).expect("read"), b"original");
        assert!(!tmp_path.exists(), "tmp file should be cleaned up");

        let mut perms = fs::metadata(&readonly_dir).expect("meta").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&readonly_dir, perms).expect("chmod back");
    }
}
