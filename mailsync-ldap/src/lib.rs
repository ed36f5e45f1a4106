//! # mailsync-ldap
//!
//! LDAP implementation of the [`DirectorySource`] boundary: connect, simple
//! bind, one subtree search over the account attributes, and convert each
//! entry's attribute map into a raw record.
//!
//! The client is the synchronous `ldap3` connection: the pipeline is a
//! strict sequential cascade, so there is nothing to overlap the query with.

use ldap3::{LdapConn, Scope, SearchEntry};

use mailsync_core::types::QUERY_ATTRS;
use mailsync_core::{DirectorySource, LdapSettings, RawRecord, SourceError};

/// Directory source backed by an LDAP server.
pub struct LdapDirectory {
    settings: LdapSettings,
}

impl LdapDirectory {
    pub fn new(settings: LdapSettings) -> Self {
        Self { settings }
    }
}

fn ldap_url(settings: &LdapSettings) -> String {
    format!("ldap://{}:{}", settings.host, settings.port)
}

impl DirectorySource for LdapDirectory {
    fn fetch(&mut self) -> Result<Vec<RawRecord>, SourceError> {
        let url = ldap_url(&self.settings);
        let mut conn = LdapConn::new(&url)
            .map_err(|err| SourceError::new(format!("connect to {url}: {err}")))?;

        conn.simple_bind(&self.settings.bind_dn, &self.settings.password)
            .and_then(|result| result.success())
            .map_err(|err| {
                SourceError::new(format!("bind as {}: {err}", self.settings.bind_dn))
            })?;

        let (entries, _result) = conn
            .search(
                &self.settings.base_dn,
                Scope::Subtree,
                &self.settings.filter,
                QUERY_ATTRS.to_vec(),
            )
            .and_then(|result| result.success())
            .map_err(|err| {
                SourceError::new(format!("search under {}: {err}", self.settings.base_dn))
            })?;

        let records: Vec<RawRecord> = entries
            .into_iter()
            .map(|entry| SearchEntry::construct(entry).attrs)
            .collect();
        tracing::debug!("directory returned {} entries", records.len());

        let _ = conn.unbind();
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_is_plain_ldap_with_configured_port() {
        let settings = LdapSettings {
            host: "ldap.example.com".to_owned(),
            port: 10389,
            bind_dn: "cn=mail,dc=example,dc=com".to_owned(),
            password: "pw".to_owned(),
            base_dn: "ou=mail,dc=example,dc=com".to_owned(),
            filter: "(objectClass=mailUser)".to_owned(),
        };
        assert_eq!(ldap_url(&settings), "ldap://ldap.example.com:10389");
    }
}
