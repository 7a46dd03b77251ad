//! The four uniqueness projections derived from the shard store.

use std::fmt;

/// Which projection a unique value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UniqueKind {
    /// Public suffixes, e.g. `com`, `co.uk`.
    Tld,
    /// Second-level names without suffix, e.g. `example`.
    Domain,
    /// Full hostnames, e.g. `www.example.com`.
    FullDomain,
    /// Non-empty subdomain labels, e.g. `www`.
    Sub,
}

impl UniqueKind {
    pub const ALL: [UniqueKind; 4] = [
        UniqueKind::Tld,
        UniqueKind::Domain,
        UniqueKind::FullDomain,
        UniqueKind::Sub,
    ];

    /// Backing table name.
    pub fn table(self) -> &'static str {
        match self {
            UniqueKind::Tld => "unique_tlds",
            UniqueKind::Domain => "unique_domains",
            UniqueKind::FullDomain => "unique_full_domains",
            UniqueKind::Sub => "unique_subs",
        }
    }

    /// Key column of the backing table.
    pub fn column(self) -> &'static str {
        match self {
            UniqueKind::Tld => "tld",
            UniqueKind::Domain => "domain",
            UniqueKind::FullDomain => "hostname",
            UniqueKind::Sub => "sub",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UniqueKind::Tld => "tld",
            UniqueKind::Domain => "domain",
            UniqueKind::FullDomain => "full_domain",
            UniqueKind::Sub => "sub",
        }
    }
}

impl fmt::Display for UniqueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
