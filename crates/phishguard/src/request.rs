//! Scan request and result types shared with the web-API layer.

use serde::{Deserialize, Serialize};

use crate::config::LimitsConfig;
use crate::error::ScanError;

/// What is being scanned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ScanKind {
    #[serde(rename_all = "camelCase")]
    Email {
        subject: String,
        body: String,
        sender: String,
        recipient: String,
    },
    #[serde(rename_all = "camelCase")]
    Link {
        url: String,
        #[serde(default)]
        context: String,
    },
}

/// Immutable scan input. Never persisted as-is; only its fingerprint and
/// the resulting verdict reach storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    /// Authenticated account identity, supplied by the auth layer.
    pub account_id: String,
    /// The account's quota tier, resolved by the caller from the account
    /// record. Not part of the cache fingerprint.
    pub tier: String,
    #[serde(flatten)]
    pub kind: ScanKind,
}

impl ScanRequest {
    /// Short name of the scan kind, used as the AI scan-type hint and
    /// the usage-ledger operation label.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ScanKind::Email { .. } => "email",
            ScanKind::Link { .. } => "link",
        }
    }

    /// Checks request shape and size limits.
    ///
    /// Oversized content is rejected rather than truncated: truncation
    /// could hide the malicious part of a message.
    pub fn validate(&self, limits: &LimitsConfig) -> Result<(), ScanError> {
        if self.account_id.trim().is_empty() {
            return Err(ScanError::Malformed("accountId must not be empty".into()));
        }
        if self.tier.trim().is_empty() {
            return Err(ScanError::Malformed("tier must not be empty".into()));
        }

        match &self.kind {
            ScanKind::Email { subject, body, .. } => {
                if subject.len() > limits.max_subject_bytes {
                    return Err(ScanError::Oversized {
                        field: "subject",
                        limit: limits.max_subject_bytes,
                        actual: subject.len(),
                    });
                }
                if body.len() > limits.max_email_body_bytes {
                    return Err(ScanError::Oversized {
                        field: "body",
                        limit: limits.max_email_body_bytes,
                        actual: body.len(),
                    });
                }
            }
            ScanKind::Link { url, context } => {
                if url.chars().count() > limits.max_url_chars {
                    return Err(ScanError::Oversized {
                        field: "url",
                        limit: limits.max_url_chars,
                        actual: url.chars().count(),
                    });
                }
                if context.len() > limits.max_context_bytes {
                    return Err(ScanError::Oversized {
                        field: "context",
                        limit: limits.max_context_bytes,
                        actual: context.len(),
                    });
                }
            }
        }
        Ok(())
    }

    /// True when every content field is empty or whitespace. Such input
    /// short-circuits to a safe verdict without touching cache or AI.
    pub fn is_empty_content(&self) -> bool {
        match &self.kind {
            ScanKind::Email { subject, body, .. } => {
                subject.trim().is_empty() && body.trim().is_empty()
            }
            ScanKind::Link { url, .. } => url.trim().is_empty(),
        }
    }
}

/// Three-band verdict derived from the numeric risk score.
///
/// Ordered by severity so callers can compare bands directly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Safe,
    PotentialPhishing,
    Phishing,
}

/// Where a verdict's evidence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Heuristic,
    Ai,
}

/// Final scan output. Immutable once produced; the cache stores it
/// verbatim and the web layer serializes it to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub classification: Classification,
    /// Normalized 0-100 risk score.
    pub risk_score: u8,
    pub explanation: String,
    pub threat_indicators: Vec<String>,
    /// Which engines contributed. Excludes `Ai` on the fallback path so
    /// the extension can badge results as AI-powered vs local.
    pub sources: Vec<Source>,
    pub cached: bool,
    pub scan_duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email_request(subject: &str, body: &str) -> ScanRequest {
        ScanRequest {
            account_id: "acct-1".to_string(),
            tier: "free".to_string(),
            kind: ScanKind::Email {
                subject: subject.to_string(),
                body: body.to_string(),
                sender: "alice@example.com".to_string(),
                recipient: "bob@example.com".to_string(),
            },
        }
    }

    #[test]
    fn test_validate_accepts_normal_email() {
        let req = email_request("Weekly Team Meeting", "Agenda attached.");
        assert!(req.validate(&LimitsConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_rejects_oversized_body() {
        let req = email_request("hi", &"x".repeat(60 * 1024));
        let err = req.validate(&LimitsConfig::default()).unwrap_err();
        assert!(matches!(err, ScanError::Oversized { field: "body", .. }));
    }

    #[test]
    fn test_validate_rejects_empty_account() {
        let mut req = email_request("hi", "there");
        req.account_id = "  ".to_string();
        assert!(matches!(
            req.validate(&LimitsConfig::default()),
            Err(ScanError::Malformed(_))
        ));
    }

    #[test]
    fn test_validate_rejects_oversized_url() {
        let req = ScanRequest {
            account_id: "acct-1".to_string(),
            tier: "free".to_string(),
            kind: ScanKind::Link {
                url: format!("https://example.com/{}", "a".repeat(2100)),
                context: String::new(),
            },
        };
        assert!(matches!(
            req.validate(&LimitsConfig::default()),
            Err(ScanError::Oversized { field: "url", .. })
        ));
    }

    #[test]
    fn test_empty_content_detection() {
        assert!(email_request("  ", "\n\t").is_empty_content());
        assert!(!email_request("hello", "").is_empty_content());
    }

    #[test]
    fn test_classification_ordering() {
        assert!(Classification::Safe < Classification::PotentialPhishing);
        assert!(Classification::PotentialPhishing < Classification::Phishing);
    }

    #[test]
    fn test_request_wire_shape() {
        let json = r#"{
            "accountId": "acct-9",
            "tier": "pro",
            "kind": "link",
            "url": "https://example.com",
            "context": "found in email"
        }"#;
        let req: ScanRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.kind_name(), "link");
        assert_eq!(req.account_id, "acct-9");
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = ScanResult {
            classification: Classification::PotentialPhishing,
            risk_score: 55,
            explanation: "test".to_string(),
            threat_indicators: vec![],
            sources: vec![Source::Heuristic],
            cached: false,
            scan_duration_ms: 3,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"riskScore\":55"));
        assert!(json.contains("\"potential_phishing\""));
        assert!(json.contains("\"heuristic\""));
    }
}
