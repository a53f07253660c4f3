use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/scan-config-v1.json");

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator =
        jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
            message: format!("Failed to compile JSON schema: {}", e),
        })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| format!("{} at {}", e, e.instance_path()))
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.cache.ttl_secs == 0 || config.cache.sweep_interval_secs == 0 {
        return Err(ConfigError::Validation {
            message: "cache.ttlSecs and cache.sweepIntervalSecs must be positive".to_string(),
        });
    }

    // The AI verdict must dominate the merge whenever one is present.
    if !(0.5..=1.0).contains(&config.scoring.ai_weight) {
        return Err(ConfigError::Validation {
            message: format!(
                "scoring.aiWeight must be within [0.5, 1.0], got {}",
                config.scoring.ai_weight
            ),
        });
    }

    if !(config.scoring.category_decay > 0.0 && config.scoring.category_decay <= 1.0) {
        return Err(ConfigError::Validation {
            message: format!(
                "scoring.categoryDecay must be within (0.0, 1.0], got {}",
                config.scoring.category_decay
            ),
        });
    }

    if config.tiers.is_empty() {
        return Err(ConfigError::Validation {
            message: "at least one quota tier must be configured".to_string(),
        });
    }

    for (tier, policy) in &config.tiers {
        if policy.max_requests_per_day == 0 || policy.max_tokens_per_day == 0 {
            return Err(ConfigError::InvalidTier {
                tier: tier.clone(),
                reason: "request and token caps must be positive".to_string(),
            });
        }
        if policy.max_cost_per_day_usd <= 0.0 {
            return Err(ConfigError::InvalidTier {
                tier: tier.clone(),
                reason: "cost cap must be positive".to_string(),
            });
        }
    }

    if config.ai.enabled && config.ai.endpoint.is_empty() {
        return Err(ConfigError::Validation {
            message: "ai.endpoint is required when ai.enabled is true".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config(extra: &str) -> String {
        format!(
            r#"{{"version": "1.0", "ai": {{"enabled": false}}{}}}"#,
            extra
        )
    }

    #[test]
    fn test_load_minimal_config() {
        let config = load_config_from_str(&minimal_config("")).unwrap();
        assert_eq!(config.version, "1.0");
        assert!(!config.ai.enabled);
    }

    #[test]
    fn test_rejects_unknown_version() {
        let err = load_config_from_str(r#"{"version": "2.0", "ai": {"enabled": false}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn test_rejects_unknown_top_level_key() {
        let err =
            load_config_from_str(r#"{"version": "1.0", "bogus": 1}"#).unwrap_err();
        assert!(matches!(err, ConfigError::SchemaValidation { .. }));
    }

    #[test]
    fn test_rejects_heuristics_dominant_merge() {
        let err = load_config_from_str(&minimal_config(r#", "scoring": {"aiWeight": 0.3}"#))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn test_rejects_zero_request_cap() {
        // Schema catches the zero before semantic validation does.
        let err = load_config_from_str(&minimal_config(
            r#", "tiers": {"free": {"maxRequestsPerDay": 0, "maxTokensPerDay": 10, "maxCostPerDayUsd": 1.0}}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, ConfigError::SchemaValidation { .. }));
    }

    #[test]
    fn test_enabled_ai_requires_endpoint() {
        let err = load_config_from_str(r#"{"version": "1.0"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));

        let ok = load_config_from_str(
            r#"{"version": "1.0", "ai": {"enabled": true, "endpoint": "https://ai.internal/assess"}}"#,
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn test_custom_tier_parsed() {
        let config = load_config_from_str(&minimal_config(
            r#", "tiers": {"trial": {"maxRequestsPerDay": 5, "maxTokensPerDay": 1000, "maxCostPerDayUsd": 0.05}}"#,
        ))
        .unwrap();
        assert_eq!(config.tiers.len(), 1);
        assert_eq!(config.tiers["trial"].max_requests_per_day, 5);
    }
}
