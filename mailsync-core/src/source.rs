//! Directory source abstraction.
//!
//! The synchronization pipeline consumes an already-materialized record
//! sequence; anything that can produce one (an LDAP search, a fixture in
//! tests) plugs in here.

use thiserror::Error;

use crate::types::RawRecord;

/// A source of raw account records.
pub trait DirectorySource {
    /// Fetch every record in the configured scope.
    ///
    /// A failure here aborts the run before any artifact is touched.
    fn fetch(&mut self) -> Result<Vec<RawRecord>, SourceError>;
}

/// Directory query failure (unreachable server, bad bind, malformed result).
#[derive(Debug, Error)]
#[error("directory source failure: {0}")]
pub struct SourceError(String);

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
