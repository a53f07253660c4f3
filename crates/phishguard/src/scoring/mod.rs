//! Risk scoring: band constants, heuristic/AI score merging, and
//! explanation text.

pub mod domains;
pub mod heuristics;

pub use heuristics::{HeuristicAssessment, HeuristicEngine};

use crate::request::Classification;

/// Classification band boundaries. Every path that turns a score into a
/// band goes through [`classify`], so the thresholds live in exactly one
/// place.
pub mod bands {
    /// Scores below this are safe.
    pub const SAFE_BELOW: u8 = 40;
    /// Scores at or above this are phishing.
    pub const PHISHING_AT: u8 = 70;
}

pub fn classify(score: u8) -> Classification {
    if score >= bands::PHISHING_AT {
        Classification::Phishing
    } else if score >= bands::SAFE_BELOW {
        Classification::PotentialPhishing
    } else {
        Classification::Safe
    }
}

/// Weighted merge of the heuristic and AI scores. `ai_weight` is the AI
/// share and is validated at config load to stay in `[0.5, 1.0]`, so the
/// AI verdict always dominates when present.
pub fn merge_with_ai(heuristic_score: u8, ai_score: u8, ai_weight: f64) -> u8 {
    let merged =
        f64::from(ai_score) * ai_weight + f64::from(heuristic_score) * (1.0 - ai_weight);
    merged.round().clamp(0.0, 100.0) as u8
}

/// Explanation for a heuristics-only verdict.
pub fn heuristic_explanation(indicators: &[String]) -> String {
    if indicators.is_empty() {
        "No phishing indicators detected by local analysis.".to_string()
    } else {
        format!(
            "Local analysis flagged {} indicator{}: {}.",
            indicators.len(),
            if indicators.len() == 1 { "" } else { "s" },
            indicators.join("; ")
        )
    }
}

/// Explanation for a merged verdict. Leads with the AI reasoning and
/// falls back to the indicator summary when the provider sent none.
pub fn merged_explanation(ai_reasoning: &str, indicators: &[String]) -> String {
    let reasoning = ai_reasoning.trim();
    if reasoning.is_empty() {
        heuristic_explanation(indicators)
    } else if indicators.is_empty() {
        reasoning.to_string()
    } else {
        format!(
            "{} Local analysis agreed on {} indicator{}.",
            reasoning,
            indicators.len(),
            if indicators.len() == 1 { "" } else { "s" },
        )
    }
}
