//! Deterministic cache keys for scan input.
//!
//! Identical logical input must always produce the same fingerprint, so
//! normalization is deliberately asymmetric: sender addresses and URL
//! hosts are case-insensitive, but subject, body, context, and URL paths
//! keep their case — casing there can itself be a phishing signal.

use sha2::{Digest, Sha256};

use crate::request::{ScanKind, ScanRequest};

/// SHA-256 over the normalized scan content, hex-encoded.
///
/// Keyed on kind + content only; the account is intentionally excluded so
/// identical content shares one cache entry across accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn compute(request: &ScanRequest) -> Self {
        let mut hasher = Sha256::new();

        match &request.kind {
            ScanKind::Email {
                subject,
                body,
                sender,
                recipient,
            } => {
                update_field(&mut hasher, "email");
                update_field(&mut hasher, subject.trim());
                update_field(&mut hasher, body.trim());
                update_field(&mut hasher, &sender.trim().to_lowercase());
                update_field(&mut hasher, &recipient.trim().to_lowercase());
            }
            ScanKind::Link { url, context } => {
                update_field(&mut hasher, "link");
                update_field(&mut hasher, &normalize_url(url.trim()));
                update_field(&mut hasher, context.trim());
            }
        }

        Fingerprint(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Length-prefixes each field so field boundaries cannot collide
/// ("ab" + "c" never hashes like "a" + "bc").
fn update_field(hasher: &mut Sha256, field: &str) {
    hasher.update((field.len() as u64).to_le_bytes());
    hasher.update(field.as_bytes());
}

/// Lowercases the scheme and host of a URL, leaving path and query
/// untouched.
fn normalize_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    let after_scheme = scheme_end + 3;
    let host_end = url[after_scheme..]
        .find('/')
        .map(|i| after_scheme + i)
        .unwrap_or(url.len());

    let mut normalized = String::with_capacity(url.len());
    normalized.push_str(&url[..host_end].to_lowercase());
    normalized.push_str(&url[host_end..]);
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email_request(subject: &str, body: &str, sender: &str) -> ScanRequest {
        ScanRequest {
            account_id: "acct-1".to_string(),
            tier: "free".to_string(),
            kind: ScanKind::Email {
                subject: subject.to_string(),
                body: body.to_string(),
                sender: sender.to_string(),
                recipient: "bob@example.com".to_string(),
            },
        }
    }

    fn link_request(url: &str) -> ScanRequest {
        ScanRequest {
            account_id: "acct-1".to_string(),
            tier: "free".to_string(),
            kind: ScanKind::Link {
                url: url.to_string(),
                context: String::new(),
            },
        }
    }

    #[test]
    fn test_deterministic() {
        let req = email_request("Subject", "Body text", "alice@example.com");
        let a = Fingerprint::compute(&req);
        let b = Fingerprint::compute(&req);
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn test_account_does_not_affect_fingerprint() {
        let mut a = email_request("Subject", "Body", "alice@example.com");
        let mut b = a.clone();
        a.account_id = "acct-1".to_string();
        b.account_id = "acct-2".to_string();
        assert_eq!(Fingerprint::compute(&a), Fingerprint::compute(&b));
    }

    #[test]
    fn test_sender_case_insensitive() {
        let a = email_request("Subject", "Body", "Alice@Example.COM");
        let b = email_request("Subject", "Body", "alice@example.com");
        assert_eq!(Fingerprint::compute(&a), Fingerprint::compute(&b));
    }

    #[test]
    fn test_body_case_sensitive() {
        let a = email_request("Subject", "VERIFY NOW", "alice@example.com");
        let b = email_request("Subject", "verify now", "alice@example.com");
        assert_ne!(Fingerprint::compute(&a), Fingerprint::compute(&b));
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        let a = email_request("  Subject  ", "Body\n", "alice@example.com ");
        let b = email_request("Subject", "Body", "alice@example.com");
        assert_eq!(Fingerprint::compute(&a), Fingerprint::compute(&b));
    }

    #[test]
    fn test_url_host_case_insensitive_path_sensitive() {
        let a = link_request("HTTPS://Bit.LY/AbC");
        let b = link_request("https://bit.ly/AbC");
        let c = link_request("https://bit.ly/abc");
        assert_eq!(Fingerprint::compute(&a), Fingerprint::compute(&b));
        assert_ne!(Fingerprint::compute(&b), Fingerprint::compute(&c));
    }

    #[test]
    fn test_kind_separates_namespaces() {
        // A link and an email with coincidentally equal field bytes must
        // not collide.
        let link = link_request("Subject");
        let email = email_request("Subject", "", "");
        assert_ne!(Fingerprint::compute(&link), Fingerprint::compute(&email));
    }

    #[test]
    fn test_field_boundaries_do_not_collide() {
        let a = email_request("ab", "c", "s@example.com");
        let b = email_request("a", "bc", "s@example.com");
        assert_ne!(Fingerprint::compute(&a), Fingerprint::compute(&b));
    }
}
