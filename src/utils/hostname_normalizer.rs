//! Hostname validation and decomposition.
//!
//! Turns raw hostnames into [`HostnameParts`] using the public suffix list
//! bundled with the `psl` crate.
//!
//! # Normalization Rules
//!
//! 1. **Case**: converted to lowercase
//! 2. **Trailing dot**: a single trailing dot is removed (`example.com.`)
//! 3. **IDN**: non-ASCII hostnames are converted to punycode
//! 4. **Syntax**: at most 253 bytes, labels of 1-63 bytes made of `a-z`, `0-9`,
//!    `-` and `_`, no leading or trailing hyphen, `*` only as the first label
//! 5. **IP addresses** are rejected

use std::net::Ipv4Addr;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use crate::domain::entities::HostnameParts;
use crate::error::AppError;

/// Maximum length of a hostname in its textual form.
const MAX_HOSTNAME_LEN: usize = 253;

/// Compiled regex for a single DNS label.
static LABEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_]([a-z0-9_-]{0,61}[a-z0-9_])?$").unwrap());

/// Lowercases the input and strips one trailing dot.
pub fn clean(hostname: &str) -> String {
    let lower = hostname.to_lowercase();
    match lower.strip_suffix('.') {
        Some(stripped) => stripped.to_string(),
        None => lower,
    }
}

/// Checks that a cleaned hostname is syntactically valid.
///
/// # Errors
///
/// Returns [`AppError::InvalidDomain`] with the offending label in `details`.
pub fn validate(hostname: &str) -> Result<(), AppError> {
    if hostname.is_empty() || hostname.len() > MAX_HOSTNAME_LEN {
        return Err(AppError::invalid_domain(
            "Invalid hostname length",
            json!({ "min": 1, "max": MAX_HOSTNAME_LEN, "provided": hostname.len() }),
        ));
    }

    if hostname.parse::<Ipv4Addr>().is_ok() {
        return Err(AppError::invalid_domain(
            "IP addresses are not hostnames",
            json!({ "hostname": hostname }),
        ));
    }

    for (i, label) in hostname.split('.').enumerate() {
        if i == 0 && label == "*" {
            continue;
        }
        if !LABEL_REGEX.is_match(label) {
            return Err(AppError::invalid_domain(
                "Invalid hostname label",
                json!({ "hostname": hostname, "label": label }),
            ));
        }
    }

    Ok(())
}

/// Checks a bare second-level name such as `example`.
///
/// # Errors
///
/// Returns [`AppError::InvalidDomain`] if `label` is not a single valid DNS label.
pub fn validate_label(label: &str) -> Result<String, AppError> {
    let cleaned = clean(label);

    if !LABEL_REGEX.is_match(&cleaned) {
        return Err(AppError::invalid_domain(
            "Invalid domain label",
            json!({ "label": label }),
        ));
    }

    Ok(cleaned)
}

/// Validates, cleans and decomposes a hostname.
///
/// # Errors
///
/// Returns [`AppError::InvalidDomain`] for malformed input.
/// Returns [`AppError::NotDecomposable`] when the hostname is itself a public
/// suffix or has no registrable part.
///
/// # Examples
///
/// ```ignore
/// let parts = normalize("WWW.Example.co.uk.").unwrap();
/// assert_eq!(parts.label, "www");
/// assert_eq!(parts.domain, "example");
/// assert_eq!(parts.suffix, "co.uk");
/// ```
pub fn normalize(hostname: &str) -> Result<HostnameParts, AppError> {
    let mut cleaned = clean(hostname);

    if !cleaned.is_ascii() {
        cleaned = to_ascii(&cleaned)?;
    }

    validate(&cleaned)?;
    decompose(&cleaned)
}

/// Normalizes and returns only the registrable `(domain, suffix)` pair.
///
/// # Errors
///
/// Same as [`normalize`].
pub fn registrable(hostname: &str) -> Result<(String, String), AppError> {
    let parts = normalize(hostname)?;
    Ok((parts.domain, parts.suffix))
}

fn to_ascii(hostname: &str) -> Result<String, AppError> {
    match url::Host::parse(hostname) {
        Ok(url::Host::Domain(ascii)) => Ok(ascii),
        Ok(_) => Err(AppError::invalid_domain(
            "IP addresses are not hostnames",
            json!({ "hostname": hostname }),
        )),
        Err(e) => Err(AppError::invalid_domain(
            "Invalid internationalized hostname",
            json!({ "hostname": hostname, "reason": e.to_string() }),
        )),
    }
}

fn decompose(hostname: &str) -> Result<HostnameParts, AppError> {
    let not_decomposable = || {
        AppError::not_decomposable(
            "Hostname has no registrable domain",
            json!({ "hostname": hostname }),
        )
    };

    let registrable = psl::domain(hostname.as_bytes()).ok_or_else(not_decomposable)?;
    let suffix = std::str::from_utf8(registrable.suffix().as_bytes())
        .map_err(|_| not_decomposable())?;
    let registrable =
        std::str::from_utf8(registrable.as_bytes()).map_err(|_| not_decomposable())?;

    let domain = registrable
        .strip_suffix(suffix)
        .and_then(|rest| rest.strip_suffix('.'))
        .filter(|d| !d.is_empty() && *d != "*")
        .ok_or_else(not_decomposable)?;

    let label = hostname
        .strip_suffix(registrable)
        .map(|rest| rest.strip_suffix('.').unwrap_or(rest))
        .unwrap_or_default();

    Ok(HostnameParts::new(label, domain, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_hostname() {
        let parts = normalize("www.example.com").unwrap();
        assert_eq!(parts, HostnameParts::new("www", "example", "com"));
    }

    #[test]
    fn test_registrable_domain_has_empty_label() {
        let parts = normalize("example.com").unwrap();
        assert_eq!(parts, HostnameParts::new("", "example", "com"));
    }

    #[test]
    fn test_multi_label_suffix() {
        let parts = normalize("www.example.co.uk").unwrap();
        assert_eq!(parts, HostnameParts::new("www", "example", "co.uk"));
    }

    #[test]
    fn test_nested_subdomain_keeps_dots() {
        let parts = normalize("a.b.c.example.com").unwrap();
        assert_eq!(parts.label, "a.b.c");
        assert_eq!(parts.domain, "example");
    }

    #[test]
    fn test_lowercase_and_trailing_dot() {
        let parts = normalize("API.Example.COM.").unwrap();
        assert_eq!(parts, HostnameParts::new("api", "example", "com"));
    }

    #[test]
    fn test_unknown_tld_is_treated_as_suffix() {
        let parts = normalize("www.test.example").unwrap();
        assert_eq!(parts, HostnameParts::new("www", "test", "example"));
    }

    #[test]
    fn test_wildcard_leading_label() {
        let parts = normalize("*.example.com").unwrap();
        assert_eq!(parts.label, "*");
    }

    #[test]
    fn test_wildcard_not_leading_is_invalid() {
        let err = normalize("www.*.example.com").unwrap_err();
        assert!(matches!(err, AppError::InvalidDomain { .. }));
    }

    #[test]
    fn test_idn_is_converted_to_punycode() {
        let parts = normalize("bücher.de").unwrap();
        assert_eq!(parts.domain, "xn--bcher-kva");
        assert_eq!(parts.suffix, "de");
    }

    #[test]
    fn test_invalid_characters() {
        let err = normalize("not a domain!!").unwrap_err();
        assert!(matches!(err, AppError::InvalidDomain { .. }));
    }

    #[test]
    fn test_empty_label() {
        assert!(matches!(
            normalize("www..example.com").unwrap_err(),
            AppError::InvalidDomain { .. }
        ));
        assert!(matches!(
            normalize("").unwrap_err(),
            AppError::InvalidDomain { .. }
        ));
    }

    #[test]
    fn test_hyphen_rules() {
        assert!(normalize("my-host.example.com").is_ok());
        assert!(normalize("-host.example.com").is_err());
        assert!(normalize("host-.example.com").is_err());
    }

    #[test]
    fn test_label_too_long() {
        let hostname = format!("{}.example.com", "a".repeat(64));
        assert!(matches!(
            normalize(&hostname).unwrap_err(),
            AppError::InvalidDomain { .. }
        ));
    }

    #[test]
    fn test_hostname_too_long() {
        let label = "a".repeat(60);
        let hostname = format!("{label}.{label}.{label}.{label}.{label}.com");
        assert!(hostname.len() > MAX_HOSTNAME_LEN);
        assert!(matches!(
            normalize(&hostname).unwrap_err(),
            AppError::InvalidDomain { .. }
        ));
    }

    #[test]
    fn test_ip_address_rejected() {
        assert!(matches!(
            normalize("192.168.1.1").unwrap_err(),
            AppError::InvalidDomain { .. }
        ));
    }

    #[test]
    fn test_bare_public_suffix_not_decomposable() {
        assert!(matches!(
            normalize("com").unwrap_err(),
            AppError::NotDecomposable { .. }
        ));
        assert!(matches!(
            normalize("co.uk").unwrap_err(),
            AppError::NotDecomposable { .. }
        ));
    }

    #[test]
    fn test_wildcard_registrable_not_decomposable() {
        assert!(normalize("*.com").unwrap_err().is_domain_error());
    }

    #[test]
    fn test_registrable_discards_label() {
        let (domain, suffix) = registrable("deep.sub.example.org").unwrap();
        assert_eq!(domain, "example");
        assert_eq!(suffix, "org");
    }

    #[test]
    fn test_validate_label() {
        assert_eq!(validate_label("Example").unwrap(), "example");
        assert!(validate_label("example.com").is_err());
        assert!(validate_label("").is_err());
    }
}
