//! Mailsync core library — record types, normalization, settings, errors.
//!
//! Public API surface:
//! - [`types`] — raw/validated record types and attribute names
//! - [`record`] — [`record::normalize`] and [`record::domain_set`]
//! - [`config`] — [`Settings`] loading and path resolution
//! - [`source`] — [`DirectorySource`] boundary trait
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod error;
pub mod record;
pub mod source;
pub mod types;

pub use config::{LdapSettings, Settings};
pub use error::ConfigError;
pub use source::{DirectorySource, SourceError};
pub use types::{AccountRecord, InvalidRecord, Normalized, RawRecord, RecordFault};
