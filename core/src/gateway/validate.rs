//! Boundary validation for analysis responses.
//!
//! A response that decodes but breaks a case invariant is a
//! MalformedResponse. Finite risk scores outside [0, 1] are clamped.

use crate::{
    error::{DeskError, DeskResult},
    model::Case,
    risk::clamp_score,
};
use std::collections::HashSet;

pub fn validate_cases(endpoint: &str, mut cases: Vec<Case>) -> DeskResult<Vec<Case>> {
    let malformed = |reason: String| DeskError::MalformedResponse {
        endpoint: endpoint.to_string(),
        reason,
    };

    let mut seen_ids = HashSet::new();
    for case in &mut cases {
        if case.case_id.trim().is_empty() {
            return Err(malformed("case with empty case_id".into()));
        }
        if !seen_ids.insert(case.case_id.clone()) {
            return Err(malformed(format!("duplicate case_id {}", case.case_id)));
        }
        if case.transactions.is_empty() {
            return Err(malformed(format!("case {} has no transactions", case.case_id)));
        }
        if case.signals.is_empty() {
            return Err(malformed(format!("case {} has no signals", case.case_id)));
        }
        if !case.risk_score.is_finite() {
            return Err(malformed(format!("case {} has non-finite risk_score", case.case_id)));
        }
        if !(0.0..=1.0).contains(&case.risk_score) {
            let clamped = clamp_score(case.risk_score);
            log::warn!(
                "case {} risk_score {} outside [0,1], clamped to {}",
                case.case_id, case.risk_score, clamped
            );
            case.risk_score = clamped;
        }

        let mut seen_signals = HashSet::new();
        for signal in &mut case.signals {
            if !seen_signals.insert(signal.name.clone()) {
                return Err(malformed(format!(
                    "case {} repeats signal {}", case.case_id, signal.name
                )));
            }
            if !signal.score.is_finite() {
                return Err(malformed(format!(
                    "case {} signal {} has non-finite score", case.case_id, signal.name
                )));
            }
            signal.score = clamp_score(signal.score);
        }
    }
    Ok(cases)
}
