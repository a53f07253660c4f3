//! Scan pipeline: validation, cache, heuristics, quota gate, AI merge.
//!
//! The order of stages is the cost-control contract: the cache answers
//! before any scoring runs, the quota gate sits in front of the AI call,
//! and every AI failure degrades to the heuristics-only verdict. The
//! only error a caller ever sees is a rejected request.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use tokio::task::JoinHandle;

use crate::ai::{AiAssessor, Verdict};
use crate::cache::CacheStore;
use crate::config::Config;
use crate::db::{usage_repo, Database, DatabaseError};
use crate::error::ScanError;
use crate::fingerprint::Fingerprint;
use crate::ledger::{Operation, UsageLedger};
use crate::request::{ScanRequest, ScanResult, Source};
use crate::scoring::{self, HeuristicEngine};

pub struct ScanPipeline {
    config: Config,
    cache: CacheStore,
    ledger: UsageLedger,
    heuristics: HeuristicEngine,
    assessor: Option<Arc<dyn AiAssessor>>,
    shutdown: Arc<AtomicBool>,
}

impl ScanPipeline {
    /// Wires the pipeline onto one database handle. Pass `None` as the
    /// assessor to run heuristics-only (AI disabled or key missing).
    pub fn new(config: Config, db: Database, assessor: Option<Arc<dyn AiAssessor>>) -> Self {
        let cache = CacheStore::new(db.clone(), Duration::from_secs(config.cache.ttl_secs));
        let ledger = UsageLedger::new(db, config.tiers.clone());
        let heuristics = HeuristicEngine::new(config.scoring.clone());
        Self {
            config,
            cache,
            ledger,
            heuristics,
            assessor,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Runs one scan end to end.
    ///
    /// Returns `Err` only for invalid requests. Quota exhaustion, AI
    /// outages, and storage failures all degrade internally.
    pub async fn scan(&self, request: &ScanRequest) -> Result<ScanResult, ScanError> {
        let started = Instant::now();
        request.validate(&self.config.limits)?;

        // Nothing to scan: safe verdict, no cache write, no AI spend.
        if request.is_empty_content() {
            return Ok(ScanResult {
                classification: scoring::classify(0),
                risk_score: 0,
                explanation: "The request contained no content to scan.".to_string(),
                threat_indicators: Vec::new(),
                sources: vec![Source::Heuristic],
                cached: false,
                scan_duration_ms: elapsed_ms(started),
            });
        }

        let fingerprint = Fingerprint::compute(request);
        if let Some(mut result) = self.cache.get(&fingerprint) {
            debug!("Cache hit for {} scan", request.kind_name());
            result.cached = true;
            result.scan_duration_ms = elapsed_ms(started);
            return Ok(result);
        }

        let assessment = self.heuristics.assess(request);
        let verdict = self.try_ai(request).await;

        let (risk_score, explanation, sources) = match &verdict {
            Some(v) => (
                scoring::merge_with_ai(assessment.score, v.risk_score, self.config.scoring.ai_weight),
                scoring::merged_explanation(&v.reasoning, &assessment.indicators),
                vec![Source::Heuristic, Source::Ai],
            ),
            None => (
                assessment.score,
                scoring::heuristic_explanation(&assessment.indicators),
                vec![Source::Heuristic],
            ),
        };

        let result = ScanResult {
            classification: scoring::classify(risk_score),
            risk_score,
            explanation,
            threat_indicators: assessment.indicators,
            sources,
            cached: false,
            scan_duration_ms: elapsed_ms(started),
        };

        self.cache.put(&fingerprint, &result);
        Ok(result)
    }

    /// Attempts the AI path. Returns `None` whenever the scan should
    /// proceed on heuristics alone: no assessor, quota denied, timeout,
    /// or provider failure.
    async fn try_ai(&self, request: &ScanRequest) -> Option<Verdict> {
        let assessor = self.assessor.as_ref()?;
        if !self.config.ai.enabled {
            return None;
        }

        let decision = self.ledger.check_quota(&request.account_id, &request.tier);
        if !decision.allowed {
            info!(
                "Quota exhausted for account {}, falling back to heuristics",
                request.account_id
            );
            return None;
        }

        let deadline = Duration::from_secs(self.config.ai.timeout_secs);
        let verdict = match tokio::time::timeout(deadline, assessor.assess(request)).await {
            Ok(Ok(verdict)) => verdict,
            Ok(Err(e)) => {
                warn!("AI assessment failed, falling back to heuristics: {}", e);
                return None;
            }
            Err(_) => {
                warn!(
                    "AI assessment exceeded {}s deadline, falling back to heuristics",
                    self.config.ai.timeout_secs
                );
                return None;
            }
        };

        // Bill only completed calls; a cache hit or fallback never
        // reaches this point.
        let cost_usd =
            f64::from(verdict.tokens_used) / 1000.0 * self.config.ai.cost_per_1k_tokens_usd;
        self.ledger.record(
            &request.account_id,
            Operation::for_kind(request.kind_name()),
            verdict.tokens_used,
            cost_usd,
        );
        Some(verdict)
    }

    /// Starts the periodic sweep of expired cache rows. Runs until
    /// [`shutdown`](Self::shutdown) is called.
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let cache = self.cache.clone();
        let shutdown = Arc::clone(&self.shutdown);
        let period = Duration::from_secs(self.config.cache.sweep_interval_secs);

        tokio::spawn(async move {
            let mut timer = tokio::time::interval(period);
            timer.tick().await; // skip immediate first tick

            loop {
                timer.tick().await;
                if shutdown.load(Ordering::Acquire) {
                    break;
                }
                cache.sweep_expired();
            }
        })
    }

    /// Signals the sweeper to stop after its current tick.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    /// Usage rows for an account, newest first. For dashboards.
    pub fn usage_history(
        &self,
        account_id: &str,
        limit: u32,
    ) -> Result<Vec<usage_repo::UsageRow>, DatabaseError> {
        self.ledger.history(account_id, limit)
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn ledger(&self) -> &UsageLedger {
        &self.ledger
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
