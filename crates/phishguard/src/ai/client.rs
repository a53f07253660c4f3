//! HTTP client for the AI assessment provider.

use std::time::Duration;

use log::{debug, warn};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{AiAssessor, AiError, Verdict};
use crate::config::AiConfig;
use crate::request::{ScanKind, ScanRequest};

/// TCP connect timeout; the per-request deadline comes from config.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum length for logged provider error bodies to prevent log
/// flooding.
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Truncates a provider error body to a reasonable length before it
/// reaches logs or error messages.
fn truncate_error_body(body: &str) -> String {
    if body.len() > MAX_ERROR_BODY_LENGTH {
        let cut = body
            .char_indices()
            .take_while(|(i, _)| *i < MAX_ERROR_BODY_LENGTH)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}... (truncated)", &body[..cut])
    } else {
        body.to_string()
    }
}

/// Neutralizes instruction-style token sequences in scanned content
/// before it is embedded in the provider prompt. Phishing messages are
/// adversarial input; without this a message body could smuggle
/// instructions to the model.
fn sanitize_for_prompt(text: &str) -> String {
    text.replace("<|", "< |")
        .replace("|>", "| >")
        .replace("[INST]", "[ INST ]")
        .replace("[/INST]", "[ / INST ]")
        .replace("<<SYS>>", "< < SYS > >")
        .replace("<</SYS>>", "< < / SYS > >")
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssessmentRequest<'a> {
    model: &'a str,
    scan_type: &'a str,
    content: serde_json::Value,
}

/// Raw provider verdict before validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerdictWire {
    risk_score: f64,
    #[serde(default)]
    label: String,
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    tokens_used: u32,
}

pub struct HttpAiClient {
    http: Client,
    endpoint: String,
    model: String,
    api_key: SecretString,
}

impl HttpAiClient {
    /// Builds a client from config, reading the API key from the
    /// configured environment variable.
    pub fn from_config(config: &AiConfig) -> Result<Self, AiError> {
        if !config.enabled {
            return Err(AiError::Disabled);
        }
        let api_key = std::env::var(&config.api_key_env_var)
            .map(SecretString::from)
            .map_err(|_| AiError::MissingApiKey(config.api_key_env_var.clone()))?;

        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn build_request<'a>(&'a self, request: &ScanRequest) -> AssessmentRequest<'a> {
        let content = match &request.kind {
            ScanKind::Email {
                subject,
                body,
                sender,
                recipient,
            } => json!({
                "subject": sanitize_for_prompt(subject),
                "body": sanitize_for_prompt(body),
                "sender": sanitize_for_prompt(sender),
                "recipient": sanitize_for_prompt(recipient),
            }),
            ScanKind::Link { url, context } => json!({
                "url": sanitize_for_prompt(url),
                "context": sanitize_for_prompt(context),
            }),
        };
        AssessmentRequest {
            model: &self.model,
            scan_type: request.kind_name(),
            content,
        }
    }
}

#[async_trait::async_trait]
impl AiAssessor for HttpAiClient {
    async fn assess(&self, request: &ScanRequest) -> Result<Verdict, AiError> {
        let body = self.build_request(request);
        debug!("Requesting AI assessment for a {} scan", body.scan_type);

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout
                } else {
                    AiError::Http(e)
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(AiError::Http)?;

        if !status.is_success() {
            warn!("AI provider returned status {}", status);
            return Err(AiError::Provider {
                status: status.as_u16(),
                body: truncate_error_body(&text),
            });
        }

        parse_verdict(&text)
    }
}

/// Parses and validates a provider response body.
///
/// Tolerates leading or trailing prose around the JSON object, and
/// rejects out-of-range or non-finite risk scores.
fn parse_verdict(body: &str) -> Result<Verdict, AiError> {
    let json_str = extract_json(body);
    let wire: VerdictWire = serde_json::from_str(&json_str)
        .map_err(|e| AiError::MalformedResponse(e.to_string()))?;

    if !wire.risk_score.is_finite() || !(0.0..=100.0).contains(&wire.risk_score) {
        return Err(AiError::MalformedResponse(format!(
            "riskScore {} is outside 0-100",
            wire.risk_score
        )));
    }

    Ok(Verdict {
        risk_score: wire.risk_score.round() as u8,
        label: wire.label,
        reasoning: wire.reasoning,
        tokens_used: wire.tokens_used,
    })
}

/// Extracts the first top-level JSON object from a response, using a
/// scanner that tracks string boundaries and escape sequences.
fn extract_json(response: &str) -> String {
    let start = match response.find('{') {
        Some(idx) => idx,
        None => return response.to_string(),
    };

    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;
    let mut end = response.len();

    for (i, c) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    end = start + i + 1;
                    break;
                }
            }
            _ => {}
        }
    }

    response[start..end].to_string()
}
