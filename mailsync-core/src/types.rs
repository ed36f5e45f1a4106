//! Domain types for mail account records.
//!
//! A [`RawRecord`] is whatever the directory source hands back: an
//! attribute-to-values map that may be incomplete or malformed. Normalization
//! (see [`crate::record`]) turns it into either a fully valid
//! [`AccountRecord`] or an [`InvalidRecord`] carrying a typed fault, never
//! anything in between.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Raw records and attribute names
// ---------------------------------------------------------------------------

/// Unvalidated attribute map as returned by the directory source.
///
/// Values keep the order the source returned them in.
pub type RawRecord = HashMap<String, Vec<String>>;

/// Account identity (email-like, e.g. `user@example.com`).
pub const ATTR_IDENTITY: &str = "uid";
/// Opaque credential material.
pub const ATTR_SECRET: &str = "userPassword";
/// Numeric owner id.
pub const ATTR_UID_NUMBER: &str = "uidNumber";
/// Numeric group id.
pub const ATTR_GID_NUMBER: &str = "gidNumber";
/// Mail storage path.
pub const ATTR_MAIL_DIR: &str = "homeDirectory";
/// Optional storage quota (e.g. `10G`).
pub const ATTR_QUOTA: &str = "mailQuota";

/// Every attribute the directory query must request.
pub const QUERY_ATTRS: &[&str] = &[
    ATTR_IDENTITY,
    ATTR_SECRET,
    ATTR_UID_NUMBER,
    ATTR_GID_NUMBER,
    ATTR_MAIL_DIR,
    ATTR_QUOTA,
];

// ---------------------------------------------------------------------------
// Validated records
// ---------------------------------------------------------------------------

/// A validated mail account entry.
///
/// Constructed once per raw record during a synchronization run and immutable
/// afterwards. All required fields are guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub email: String,
    pub password: String,
    pub uid: u32,
    pub gid: u32,
    pub mail_dir: String,
    /// Extra userdb metadata, currently only the quota directive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_fields: Option<String>,
}

impl AccountRecord {
    /// Domain suffix of the identity: everything after the first `@`.
    pub fn domain(&self) -> Option<&str> {
        self.email.split_once('@').map(|(_, domain)| domain)
    }
}

/// Why a raw record failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordFault {
    #[error("required attribute `{0}` is missing")]
    Missing(&'static str),

    #[error("required attribute `{0}` is empty")]
    Empty(&'static str),

    #[error("required attribute `{0}` has {1} values, expected exactly one")]
    Multivalued(&'static str, usize),

    #[error("attribute `{0}` is not a number: `{1}`")]
    NotNumeric(&'static str, String),
}

/// A raw record that failed validation, with the identity attempt (if the
/// source supplied one) kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRecord {
    pub identity: Option<String>,
    pub fault: RecordFault,
}

impl fmt::Display for InvalidRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.identity {
            Some(identity) => write!(f, "record `{identity}`: {}", self.fault),
            None => write!(f, "record without identity: {}", self.fault),
        }
    }
}

/// Outcome of normalizing one raw record.
pub type Normalized = Result<AccountRecord, InvalidRecord>;

#[cfg(test)]
mod tests {
    use super::*;

    fn record(email: &str) -> AccountRecord {
        AccountRecord {
            email: email.to_owned(),
            password: "secret".to_owned(),
            uid: 1001,
            gid: 1001,
            mail_dir: "/var/mail/u".to_owned(),
            extra_fields: None,
        }
    }

    #[test]
    fn domain_is_suffix_after_first_at() {
        assert_eq!(record("u@example.com").domain(), Some("example.com"));
        assert_eq!(record("odd@a@b").domain(), Some("a@b"));
        assert_eq!(record("no-at-sign").domain(), None);
    }

    #[test]
    fn invalid_record_display_includes_identity_when_known() {
        let invalid = InvalidRecord {
            identity: Some("u@example.com".to_owned()),
            fault: RecordFault::Missing(ATTR_SECRET),
        };
        let text = invalid.to_string();
        assert!(text.contains("u@example.com"));
        assert!(text.contains("userPassword"));

        let anonymous = InvalidRecord {
            identity: None,
            fault: RecordFault::Missing(ATTR_IDENTITY),
        };
        assert!(anonymous.to_string().contains("without identity"));
    }
}
