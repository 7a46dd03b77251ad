//! Shard documents: the unit of storage for a domain's label set.

use std::collections::BTreeSet;

/// Identity of a shard document. Unique across the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShardKey {
    pub domain: String,
    pub suffix: String,
    pub shard: u32,
}

impl ShardKey {
    pub fn new(domain: impl Into<String>, suffix: impl Into<String>, shard: u32) -> Self {
        Self {
            domain: domain.into(),
            suffix: suffix.into(),
            shard,
        }
    }

    /// Key of the next shard in the same domain family.
    pub fn next(&self) -> Self {
        Self {
            domain: self.domain.clone(),
            suffix: self.suffix.clone(),
            shard: self.shard + 1,
        }
    }
}

/// One partial label set of a `(domain, suffix)` family.
///
/// The union of `labels` over every shard of a family is the full set of known
/// subdomain labels. A label appears in at most one shard of its family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardDocument {
    pub domain: String,
    pub suffix: String,
    pub shard: u32,
    pub labels: BTreeSet<String>,
}

/// Fixed per-document overhead of the serialized-size model (field names,
/// type tags, lengths, shard index and the labels array header).
const DOCUMENT_OVERHEAD: u64 = 64;

/// Per-entry overhead of a label inside the labels array.
const LABEL_OVERHEAD: u64 = 14;

impl ShardDocument {
    pub fn new(domain: impl Into<String>, suffix: impl Into<String>, shard: u32) -> Self {
        Self {
            domain: domain.into(),
            suffix: suffix.into(),
            shard,
            labels: BTreeSet::new(),
        }
    }

    /// Serialized size of an empty document for this family.
    pub fn base_size(domain: &str, suffix: &str) -> u64 {
        DOCUMENT_OVERHEAD + domain.len() as u64 + suffix.len() as u64
    }

    /// Bytes one label adds to a document.
    pub fn entry_size(label: &str) -> u64 {
        LABEL_OVERHEAD + label.len() as u64
    }

    /// Serialized size of this document under the size model.
    pub fn encoded_size(&self) -> u64 {
        Self::base_size(&self.domain, &self.suffix)
            + self.labels.iter().map(|l| Self::entry_size(l)).sum::<u64>()
    }

    /// Whether `label` could ever be stored, even in a brand new shard.
    pub fn fits_empty(domain: &str, suffix: &str, label: &str, max_size: u64) -> bool {
        Self::base_size(domain, suffix) + Self::entry_size(label) <= max_size
    }

    /// Full hostnames of every label in this shard.
    pub fn full_hostnames(&self) -> impl Iterator<Item = String> + '_ {
        self.labels.iter().map(|label| {
            super::HostnameParts::full_hostname(label, &self.domain, &self.suffix)
        })
    }
}
