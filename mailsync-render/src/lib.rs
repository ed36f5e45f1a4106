//! # mailsync-render
//!
//! Pure, deterministic renderers for the mail-server configuration artifacts:
//! the passwd credential file, the virtual domain and recipient lists, and
//! the DKIM key/signing tables.

pub mod artifact;

pub use artifact::{ArtifactKind, RenderInput, SideEffect};
