//! Shared harness for integration tests: in-memory pipelines, a tiny
//! quota tier, and scripted AI assessors.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use phishguard::ai::{AiAssessor, AiError, Verdict};
use phishguard::config::{Config, QuotaPolicy};
use phishguard::db::Database;
use phishguard::pipeline::ScanPipeline;
use phishguard::request::{ScanKind, ScanRequest};

/// A config with a `test` tier capped at `max_requests` AI calls per
/// day and a short AI deadline.
pub fn test_config(max_requests: u32) -> Config {
    let mut config = Config::default();
    config.tiers.insert(
        "test".to_string(),
        QuotaPolicy {
            max_requests_per_day: max_requests,
            max_tokens_per_day: 1_000_000,
            max_cost_per_day_usd: 100.0,
        },
    );
    config.ai.timeout_secs = 1;
    config
}

pub fn pipeline(config: Config, assessor: Option<Arc<dyn AiAssessor>>) -> ScanPipeline {
    pipeline_with_db(config, assessor).0
}

/// Like [`pipeline`], but also returns the shared database handle so a
/// test can damage the store underneath the running pipeline.
pub fn pipeline_with_db(
    config: Config,
    assessor: Option<Arc<dyn AiAssessor>>,
) -> (ScanPipeline, Database) {
    let db = Database::open_in_memory().expect("Failed to create test database");
    (ScanPipeline::new(config, db.clone(), assessor), db)
}

pub fn email_request(subject: &str, body: &str, sender: &str) -> ScanRequest {
    ScanRequest {
        account_id: "acct-1".to_string(),
        tier: "test".to_string(),
        kind: ScanKind::Email {
            subject: subject.to_string(),
            body: body.to_string(),
            sender: sender.to_string(),
            recipient: "bob@example.com".to_string(),
        },
    }
}

pub fn link_request(url: &str) -> ScanRequest {
    ScanRequest {
        account_id: "acct-1".to_string(),
        tier: "test".to_string(),
        kind: ScanKind::Link {
            url: url.to_string(),
            context: String::new(),
        },
    }
}

pub fn verdict(risk_score: u8, tokens_used: u32) -> Verdict {
    Verdict {
        risk_score,
        label: String::new(),
        reasoning: "Scripted assessment.".to_string(),
        tokens_used,
    }
}

/// Always answers with the same verdict and counts how often it was
/// asked. The call count is how tests prove a cache hit or a fallback
/// spent nothing.
pub struct CountingAssessor {
    verdict: Verdict,
    calls: AtomicU32,
}

impl CountingAssessor {
    pub fn new(verdict: Verdict) -> Self {
        Self {
            verdict,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AiAssessor for CountingAssessor {
    async fn assess(&self, _request: &ScanRequest) -> Result<Verdict, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.verdict.clone())
    }
}

/// Always fails, as an unreachable or misbehaving provider would.
pub struct FailingAssessor;

#[async_trait]
impl AiAssessor for FailingAssessor {
    async fn assess(&self, _request: &ScanRequest) -> Result<Verdict, AiError> {
        Err(AiError::Provider {
            status: 503,
            body: "service unavailable".to_string(),
        })
    }
}

/// Never answers within any deadline the tests configure.
pub struct StalledAssessor;

#[async_trait]
impl AiAssessor for StalledAssessor {
    async fn assess(&self, _request: &ScanRequest) -> Result<Verdict, AiError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(verdict(50, 10))
    }
}
