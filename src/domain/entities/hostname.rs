//! Decomposed hostname produced by the normalizer.

use std::fmt;

/// A validated hostname split into subdomain label, registrable name and public suffix.
///
/// `domain` and `suffix` are never empty. `label` is empty for the registrable
/// domain itself and may contain dots for nested subdomains (`a.b` in `a.b.example.com`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostnameParts {
    pub label: String,
    pub domain: String,
    pub suffix: String,
}

impl HostnameParts {
    pub fn new(
        label: impl Into<String>,
        domain: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            domain: domain.into(),
            suffix: suffix.into(),
        }
    }

    /// Reassembles a full hostname from its parts.
    pub fn full_hostname(label: &str, domain: &str, suffix: &str) -> String {
        if label.is_empty() {
            format!("{domain}.{suffix}")
        } else {
            format!("{label}.{domain}.{suffix}")
        }
    }
}

impl fmt::Display for HostnameParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Self::full_hostname(&self.label, &self.domain, &self.suffix))
    }
}
