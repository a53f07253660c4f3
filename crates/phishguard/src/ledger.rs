//! Usage ledger: the synchronous admission gate in front of every paid
//! AI call, plus the per-account billing counters behind it.
//!
//! The ledger fails closed: if storage is unreachable the quota check
//! denies the AI path and the scan falls back to heuristics. Cost
//! protection takes priority over availability of the AI feature.

use std::collections::HashMap;

use chrono::Utc;
use log::{error, warn};

use crate::config::QuotaPolicy;
use crate::db::{usage_repo, Database, DatabaseError};

/// Ledger operation label, one per scan kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    EmailScan,
    LinkScan,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::EmailScan => "email",
            Operation::LinkScan => "link",
        }
    }

    pub fn for_kind(kind_name: &str) -> Self {
        match kind_name {
            "link" => Operation::LinkScan,
            _ => Operation::EmailScan,
        }
    }
}

/// Outcome of a quota check. Internal signal only; a denied decision
/// routes the scan to the heuristics-only path, it never becomes a
/// user-facing error.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotaDecision {
    pub allowed: bool,
    pub remaining: RemainingQuota,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemainingQuota {
    pub requests: u32,
    pub tokens: u64,
    pub cost_usd: f64,
}

impl QuotaDecision {
    fn denied() -> Self {
        Self {
            allowed: false,
            remaining: RemainingQuota::default(),
        }
    }
}

pub struct UsageLedger {
    db: Database,
    tiers: HashMap<String, QuotaPolicy>,
}

impl UsageLedger {
    pub fn new(db: Database, tiers: HashMap<String, QuotaPolicy>) -> Self {
        Self { db, tiers }
    }

    /// Checks today's accumulated usage against the tier policy. Must be
    /// called before any paid AI call.
    ///
    /// All three caps are independent: exceeding any one denies. An
    /// unknown tier or an unreachable store also denies.
    pub fn check_quota(&self, account_id: &str, tier: &str) -> QuotaDecision {
        let Some(policy) = self.tiers.get(tier) else {
            warn!("Unknown quota tier '{}', denying AI path", tier);
            return QuotaDecision::denied();
        };

        let rows = match usage_repo::usage_for_day(&self.db, account_id, &today()) {
            Ok(rows) => rows,
            Err(e) => {
                // Fail closed on ledger outage.
                warn!("Usage ledger unavailable, denying AI path: {}", e);
                return QuotaDecision::denied();
            }
        };

        // Caps apply to the whole day, summed over operations.
        let mut requests: i64 = 0;
        let mut tokens: i64 = 0;
        let mut cost: f64 = 0.0;
        for row in &rows {
            requests += row.request_count;
            tokens += row.token_count;
            cost += row.cost_usd;
        }

        let allowed = requests < policy.max_requests_per_day as i64
            && tokens < policy.max_tokens_per_day as i64
            && cost < policy.max_cost_per_day_usd;

        QuotaDecision {
            allowed,
            remaining: RemainingQuota {
                requests: (policy.max_requests_per_day as i64 - requests).max(0) as u32,
                tokens: (policy.max_tokens_per_day as i64 - tokens).max(0) as u64,
                cost_usd: (policy.max_cost_per_day_usd - cost).max(0.0),
            },
        }
    }

    /// Records one billed AI call. Additive and atomic per
    /// (account, day, operation); cache hits must never reach here.
    pub fn record(&self, account_id: &str, operation: Operation, tokens: u32, cost_usd: f64) {
        if let Err(e) = usage_repo::record(
            &self.db,
            account_id,
            &today(),
            operation.as_str(),
            tokens as i64,
            cost_usd,
        ) {
            // The AI call already happened; losing the increment is a
            // billing gap, not a scan failure.
            error!("Failed to record usage for {}: {}", account_id, e);
        }
    }

    /// Recent ledger rows for dashboard display.
    pub fn history(
        &self,
        account_id: &str,
        limit: u32,
    ) -> Result<Vec<usage_repo::UsageRow>, DatabaseError> {
        usage_repo::usage_history(&self.db, account_id, limit)
    }
}

/// Current UTC calendar day. Keying records on the date makes the daily
/// reset implicit.
fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}
