use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Injected configuration for the scan core.
///
/// Constructed once by the host and passed into `ScanPipeline::new`;
/// nothing here mutates at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub version: String,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default = "default_tiers")]
    pub tiers: HashMap<String, QuotaPolicy>,
    #[serde(default)]
    pub ai: AiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            cache: CacheConfig::default(),
            limits: LimitsConfig::default(),
            scoring: ScoringConfig::default(),
            tiers: default_tiers(),
            ai: AiConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheConfig {
    /// How long a cached verdict stays valid.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Period of the background sweep that removes expired entries.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_ttl_secs() -> u64 {
    3600
}

fn default_sweep_interval_secs() -> u64 {
    600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitsConfig {
    #[serde(default = "default_max_email_body_bytes")]
    pub max_email_body_bytes: usize,
    #[serde(default = "default_max_subject_bytes")]
    pub max_subject_bytes: usize,
    #[serde(default = "default_max_url_chars")]
    pub max_url_chars: usize,
    #[serde(default = "default_max_context_bytes")]
    pub max_context_bytes: usize,
}

fn default_max_email_body_bytes() -> usize {
    50 * 1024
}

fn default_max_subject_bytes() -> usize {
    2048
}

fn default_max_url_chars() -> usize {
    2000
}

fn default_max_context_bytes() -> usize {
    10 * 1024
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_email_body_bytes: default_max_email_body_bytes(),
            max_subject_bytes: default_max_subject_bytes(),
            max_url_chars: default_max_url_chars(),
            max_context_bytes: default_max_context_bytes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    /// Share of the merged score taken from the AI verdict when one is
    /// available. Must stay >= 0.5 so the AI verdict dominates.
    #[serde(default = "default_ai_weight")]
    pub ai_weight: f64,
    /// Multiplier applied to each repeated match within a signal
    /// category beyond the first `full_weight_hits`.
    #[serde(default = "default_category_decay")]
    pub category_decay: f64,
    /// Number of matches per category that count at full weight.
    #[serde(default = "default_full_weight_hits")]
    pub full_weight_hits: u32,
    #[serde(default)]
    pub weights: CategoryWeights,
}

fn default_ai_weight() -> f64 {
    0.7
}

fn default_category_decay() -> f64 {
    0.5
}

fn default_full_weight_hits() -> u32 {
    2
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            ai_weight: default_ai_weight(),
            category_decay: default_category_decay(),
            full_weight_hits: default_full_weight_hits(),
            weights: CategoryWeights::default(),
        }
    }
}

/// Base weight per signal category. Tunable policy, not an algorithmic
/// contract; only the relative ordering is meaningful.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWeights {
    #[serde(default = "default_urgency")]
    pub urgency: f64,
    #[serde(default = "default_credential_harvesting")]
    pub credential_harvesting: f64,
    #[serde(default = "default_financial_scam")]
    pub financial_scam: f64,
    #[serde(default = "default_generic_greeting")]
    pub generic_greeting: f64,
    #[serde(default = "default_lookalike_domain")]
    pub lookalike_domain: f64,
    #[serde(default = "default_shortened_url")]
    pub shortened_url: f64,
    #[serde(default = "default_suspicious_tld")]
    pub suspicious_tld: f64,
    #[serde(default = "default_ip_literal_url")]
    pub ip_literal_url: f64,
    #[serde(default = "default_punycode_host")]
    pub punycode_host: f64,
    #[serde(default = "default_embedded_credentials")]
    pub embedded_credentials: f64,
}

fn default_urgency() -> f64 {
    14.0
}

fn default_credential_harvesting() -> f64 {
    20.0
}

fn default_financial_scam() -> f64 {
    16.0
}

fn default_generic_greeting() -> f64 {
    6.0
}

fn default_lookalike_domain() -> f64 {
    45.0
}

fn default_shortened_url() -> f64 {
    40.0
}

fn default_suspicious_tld() -> f64 {
    15.0
}

fn default_ip_literal_url() -> f64 {
    35.0
}

fn default_punycode_host() -> f64 {
    30.0
}

fn default_embedded_credentials() -> f64 {
    35.0
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            urgency: default_urgency(),
            credential_harvesting: default_credential_harvesting(),
            financial_scam: default_financial_scam(),
            generic_greeting: default_generic_greeting(),
            lookalike_domain: default_lookalike_domain(),
            shortened_url: default_shortened_url(),
            suspicious_tld: default_suspicious_tld(),
            ip_literal_url: default_ip_literal_url(),
            punycode_host: default_punycode_host(),
            embedded_credentials: default_embedded_credentials(),
        }
    }
}

/// Daily allowance for one tier. All three caps are independent: a scan
/// is quota-denied as soon as any one of them is reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaPolicy {
    pub max_requests_per_day: u32,
    pub max_tokens_per_day: u64,
    pub max_cost_per_day_usd: f64,
}

fn default_tiers() -> HashMap<String, QuotaPolicy> {
    HashMap::from([
        (
            "free".to_string(),
            QuotaPolicy {
                max_requests_per_day: 25,
                max_tokens_per_day: 50_000,
                max_cost_per_day_usd: 0.50,
            },
        ),
        (
            "pro".to_string(),
            QuotaPolicy {
                max_requests_per_day: 500,
                max_tokens_per_day: 1_000_000,
                max_cost_per_day_usd: 10.0,
            },
        ),
        (
            "enterprise".to_string(),
            QuotaPolicy {
                max_requests_per_day: 5000,
                max_tokens_per_day: 10_000_000,
                max_cost_per_day_usd: 100.0,
            },
        ),
    ])
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Provider endpoint receiving the assessment request.
    #[serde(default)]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Hard deadline for one assessment call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Environment variable holding the provider API key.
    #[serde(default = "default_api_key_env_var")]
    pub api_key_env_var: String,
    /// Billing rate used to convert reported token usage into cost.
    #[serde(default = "default_cost_per_1k_tokens_usd")]
    pub cost_per_1k_tokens_usd: f64,
}

fn default_true() -> bool {
    true
}

fn default_model() -> String {
    "phish-scan-1".to_string()
}

fn default_timeout_secs() -> u64 {
    12
}

fn default_api_key_env_var() -> String {
    "PHISHGUARD_AI_API_KEY".to_string()
}

fn default_cost_per_1k_tokens_usd() -> f64 {
    0.002
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: String::new(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            api_key_env_var: default_api_key_env_var(),
            cost_per_1k_tokens_usd: default_cost_per_1k_tokens_usd(),
        }
    }
}
