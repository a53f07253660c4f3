//! AI assessment layer.
//!
//! The pipeline talks to [`AiAssessor`], never to a concrete provider;
//! [`HttpAiClient`] is the production implementation and tests substitute
//! their own. Every error here is recoverable: the caller degrades to the
//! heuristics-only path instead of failing the scan.

mod client;

pub use client::HttpAiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::request::ScanRequest;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI assessment is disabled")]
    Disabled,

    #[error("API key environment variable '{0}' is not set")]
    MissingApiKey(String),

    #[error("AI provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI provider returned status {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("Failed to parse AI provider response: {0}")]
    MalformedResponse(String),

    #[error("AI assessment timed out")]
    Timeout,
}

/// A provider verdict, already validated: the score is in range and the
/// token count is whatever the provider billed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    /// Risk score on the shared 0-100 scale.
    pub risk_score: u8,
    /// Provider's own label, informational only. Classification is
    /// always re-derived from the merged score.
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub reasoning: String,
    /// Tokens billed for this call.
    #[serde(default)]
    pub tokens_used: u32,
}

#[async_trait]
pub trait AiAssessor: Send + Sync {
    async fn assess(&self, request: &ScanRequest) -> Result<Verdict, AiError>;
}
