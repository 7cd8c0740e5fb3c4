//! Risk classification — maps a case's numeric score to a display category.
//!
//! Thresholds are inclusive lower bounds:
//!   >= 0.8 critical, >= 0.6 high, >= 0.4 medium, otherwise low.
//!
//! Scores outside [0, 1] are clamped before classification. NaN is treated
//! as 0.0 so that `classify` stays total.

use serde::{Deserialize, Serialize};
use std::fmt;

// ── Thresholds ───────────────────────────────────────────────────────────────

pub const CRITICAL_THRESHOLD: f64 = 0.8;
pub const HIGH_THRESHOLD: f64 = 0.6;
pub const MEDIUM_THRESHOLD: f64 = 0.4;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low      => "Low",
            Self::Medium   => "Medium",
            Self::High     => "High",
            Self::Critical => "Critical",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskClassification {
    pub category: RiskCategory,
    pub label:    String,
    /// The score actually classified, after clamping.
    pub score:    f64,
}

impl RiskClassification {
    /// Badge text as shown next to a case, e.g. `Critical (0.82)`.
    pub fn badge(&self) -> String {
        format!("{} ({:.2})", self.label, self.score)
    }
}

/// Bring any f64 into [0, 1]. NaN becomes 0.0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

pub fn classify(score: f64) -> RiskClassification {
    let score = clamp_score(score);
    let category = if score >= CRITICAL_THRESHOLD {
        RiskCategory::Critical
    } else if score >= HIGH_THRESHOLD {
        RiskCategory::High
    } else if score >= MEDIUM_THRESHOLD {
        RiskCategory::Medium
    } else {
        RiskCategory::Low
    };
    RiskClassification {
        category,
        label: category.label().to_string(),
        score,
    }
}
