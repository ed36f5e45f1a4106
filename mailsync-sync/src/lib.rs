//! # mailsync-sync
//!
//! Change-aware artifact synchronization: the atomic compare-then-replace
//! writer with timestamped snapshots, snapshot retention sweeping, the
//! external-operation seam, and the cascade pipeline that ties them together.
//!
//! Call [`pipeline::run_with_source`] for a full run against a directory
//! source, or [`pipeline::run`] with an already-fetched record sequence.

pub mod diff;
pub mod dkim;
pub mod error;
pub mod ops;
pub mod pipeline;
pub mod retention;
pub mod writer;

pub use diff::{diff_artifacts, FileDiff};
pub use dkim::ensure_keys;
pub use error::SyncError;
pub use ops::{MailOps, OpError, SystemOps};
pub use pipeline::{run, run_with_source, ArtifactOutcome, RunReport};
pub use retention::sweep_snapshots;
pub use writer::{write_if_changed, WriteResult};
