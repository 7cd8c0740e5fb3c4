//! Session activity log — every workflow transition the analyst could care about.
//!
//! RULE: the log is append-only and in-memory. It dies with the session.
//! Stale discards are recorded for diagnostics but never rendered as errors.

use crate::types::{CaseId, Generation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Entries kept before the oldest are dropped.
pub const ACTIVITY_LOG_CAPACITY: usize = 256;

/// Variants are appended, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeskEvent {
    // ── Analysis ───────────────────────────────────
    AnalysisStarted {
        request_seq:       u64,
        transaction_count: usize,
    },
    CasesReplaced {
        request_seq: u64,
        generation:  Generation,
        case_count:  usize,
    },
    AnalysisFailed {
        request_seq: u64,
        error:       String,
    },
    AnalysisSuperseded {
        request_seq: u64,
    },

    // ── Selection ──────────────────────────────────
    CaseSelected {
        case_id: CaseId,
    },

    // ── Summaries ──────────────────────────────────
    SummaryRequested {
        case_id:  CaseId,
        sequence: u64,
    },
    SummaryApplied {
        case_id:  CaseId,
        sequence: u64,
    },
    SummaryFailed {
        case_id:  CaseId,
        sequence: u64,
        error:    String,
    },
    SummaryDiscarded {
        case_id:  CaseId,
        sequence: u64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityEntry {
    pub at:    DateTime<Utc>,
    pub event: DeskEvent,
}

#[derive(Debug, Default)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
}

impl ActivityLog {
    pub fn record(&mut self, event: DeskEvent) {
        log::debug!("activity: {}", event_type_name(&event));
        if self.entries.len() == ACTIVITY_LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(ActivityEntry { at: Utc::now(), event });
    }

    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn events(&self) -> impl Iterator<Item = &DeskEvent> {
        self.entries.iter().map(|e| &e.event)
    }
}

/// Stable string name for a DeskEvent variant.
pub fn event_type_name(event: &DeskEvent) -> &'static str {
    match event {
        DeskEvent::AnalysisStarted { .. }    => "analysis_started",
        DeskEvent::CasesReplaced { .. }      => "cases_replaced",
        DeskEvent::AnalysisFailed { .. }     => "analysis_failed",
        DeskEvent::AnalysisSuperseded { .. } => "analysis_superseded",
        DeskEvent::CaseSelected { .. }       => "case_selected",
        DeskEvent::SummaryRequested { .. }   => "summary_requested",
        DeskEvent::SummaryApplied { .. }     => "summary_applied",
        DeskEvent::SummaryFailed { .. }      => "summary_failed",
        DeskEvent::SummaryDiscarded { .. }   => "summary_discarded",
    }
}
