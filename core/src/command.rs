use crate::{model::Transaction, types::CaseId};
use serde::{Deserialize, Serialize};

/// Everything the analyst can ask the desk to do.
/// Variants are appended, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum AnalystCommand {
    // ── Analysis ──────────────────────────────────
    LoadSample,
    Analyze { transactions: Vec<Transaction> },

    // ── Navigation ────────────────────────────────
    Select { case_id: CaseId },

    // ── Summaries ─────────────────────────────────
    Summarize,

    // ── Bridge control ────────────────────────────
    GetState,
    Quit,
}
