//! Record normalization and domain derivation.
//!
//! Validation rule: every required attribute must carry exactly one non-empty
//! value, and the numeric ids must parse. Anything else makes the whole
//! record invalid; renderers then skip it and never see partial data.

use std::collections::BTreeSet;

use crate::types::{
    AccountRecord, InvalidRecord, Normalized, RawRecord, RecordFault, ATTR_GID_NUMBER,
    ATTR_IDENTITY, ATTR_MAIL_DIR, ATTR_QUOTA, ATTR_SECRET, ATTR_UID_NUMBER,
};

/// Normalize one raw directory record. Pure; never panics.
///
/// On failure the result carries the identity attempt (first `uid` value, if
/// any) so the caller can log which entry was skipped.
pub fn normalize(raw: &RawRecord) -> Normalized {
    build(raw).map_err(|fault| InvalidRecord {
        identity: raw
            .get(ATTR_IDENTITY)
            .and_then(|values| values.first())
            .cloned(),
        fault,
    })
}

fn build(raw: &RawRecord) -> Result<AccountRecord, RecordFault> {
    let email = single(raw, ATTR_IDENTITY)?;
    let password = single(raw, ATTR_SECRET)?;
    let uid = numeric(raw, ATTR_UID_NUMBER)?;
    let gid = numeric(raw, ATTR_GID_NUMBER)?;
    let mail_dir = single(raw, ATTR_MAIL_DIR)?;

    let extra_fields = raw
        .get(ATTR_QUOTA)
        .and_then(|values| values.first())
        .map(|quota| format!("userdb_quota_rule=*:storage={quota}"));

    Ok(AccountRecord {
        email: email.to_owned(),
        password: password.to_owned(),
        uid,
        gid,
        mail_dir: mail_dir.to_owned(),
        extra_fields,
    })
}

/// The single value of a required attribute.
fn single<'a>(raw: &'a RawRecord, attr: &'static str) -> Result<&'a str, RecordFault> {
    let Some(values) = raw.get(attr) else {
        return Err(RecordFault::Missing(attr));
    };
    match values.as_slice() {
        [] => Err(RecordFault::Missing(attr)),
        [value] if value.is_empty() => Err(RecordFault::Empty(attr)),
        [value] => Ok(value),
        many => Err(RecordFault::Multivalued(attr, many.len())),
    }
}

fn numeric(raw: &RawRecord, attr: &'static str) -> Result<u32, RecordFault> {
    let value = single(raw, attr)?;
    value
        .parse()
        .map_err(|_| RecordFault::NotNumeric(attr, value.to_owned()))
}

/// Unique domain suffixes across all valid records, sorted ascending.
///
/// Identities without an `@` contribute nothing.
pub fn domain_set(records: &[Normalized]) -> BTreeSet<String> {
    records
        .iter()
        .filter_map(|normalized| normalized.as_ref().ok())
        .filter_map(AccountRecord::domain)
        .map(str::to_owned)
        .collect()
}
