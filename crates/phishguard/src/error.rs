use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhishguardError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("AI assessor error: {0}")]
    Ai(#[from] crate::ai::AiError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Invalid tier '{tier}': {reason}")]
    InvalidTier { tier: String, reason: String },
}

/// The only error a scan surfaces to callers. Every other failure mode
/// (quota exhaustion, AI unavailability, store outages) degrades to a
/// heuristics-only result instead of failing the scan.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Field '{field}' exceeds the maximum size of {limit} bytes (got {actual})")]
    Oversized {
        field: &'static str,
        limit: usize,
        actual: usize,
    },

    #[error("Malformed scan request: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, PhishguardError>;
