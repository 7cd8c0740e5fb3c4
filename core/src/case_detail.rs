//! Case detail — the summarize workflow and the detail projection.
//!
//! Per case:  Idle → Requesting → { Succeeded → Idle | Failed → Idle }
//!
//! RULES:
//!   - At most one in-flight summarize per case. A second trigger is rejected.
//!   - A result is applied only if its token is still current: same case-set
//!     generation, latest sequence for that case, and the case still selected.
//!     Anything else is a StaleResult and is dropped without a trace in the UI.
//!   - Deselecting a case cancels interest in its in-flight request. The
//!     network call is left alone; its answer just won't be applied.

use crate::{
    case_store::CaseStore,
    error::{DeskError, DeskResult},
    model::{canonical_instant, Case, Summary},
    request::CaseSummaryRequest,
    risk::{classify, RiskClassification},
    types::{CaseId, EntityId, Generation},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const ABSENT: &str = "—";

/// Ties a summarize response back to the context that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryToken {
    pub case_id:    CaseId,
    pub generation: Generation,
    pub sequence:   u64,
}

#[derive(Debug, Clone)]
pub struct PendingSummary {
    pub token:   SummaryToken,
    pub request: CaseSummaryRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SummaryPhase {
    Idle,
    Requesting { sequence: u64 },
}

/// What happened to a completed summarize call.
#[derive(Debug)]
pub enum SummaryResolution {
    Applied(Summary),
    Failed(DeskError),
    Discarded,
}

#[derive(Debug, Clone)]
struct SummaryWorkflow {
    phase:      SummaryPhase,
    last_error: Option<String>,
}

impl Default for SummaryWorkflow {
    fn default() -> Self {
        Self { phase: SummaryPhase::Idle, last_error: None }
    }
}

#[derive(Debug, Default)]
pub struct CaseDetailViewModel {
    workflows:     HashMap<CaseId, SummaryWorkflow>,
    generation:    Generation,
    next_sequence: u64,
}

impl CaseDetailViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a summarize for the selected case.
    pub fn begin_summarize(&mut self, store: &CaseStore) -> DeskResult<PendingSummary> {
        self.sync_generation(store);
        let case = store.current_selection().ok_or(DeskError::NoSelection)?;

        let workflow = self.workflows.entry(case.case_id.clone()).or_default();
        if let SummaryPhase::Requesting { .. } = workflow.phase {
            return Err(DeskError::SummaryInFlight { case_id: case.case_id.clone() });
        }

        self.next_sequence += 1;
        let sequence = self.next_sequence;
        workflow.phase = SummaryPhase::Requesting { sequence };
        workflow.last_error = None;

        log::info!("summarize requested: case={} seq={sequence}", case.case_id);
        Ok(PendingSummary {
            token: SummaryToken {
                case_id:    case.case_id.clone(),
                generation: store.generation(),
                sequence,
            },
            request: CaseSummaryRequest::from_case(case),
        })
    }

    /// Fold a finished summarize call back into the store, if still relevant.
    pub fn complete_summarize(
        &mut self,
        store: &mut CaseStore,
        token: &SummaryToken,
        outcome: DeskResult<Summary>,
    ) -> SummaryResolution {
        self.sync_generation(store);

        if let Err(stale) = self.check_current(store, token) {
            // The request that owned this slot is finished either way.
            if let Some(workflow) = self.workflows.get_mut(&token.case_id) {
                if workflow.phase == (SummaryPhase::Requesting { sequence: token.sequence }) {
                    workflow.phase = SummaryPhase::Idle;
                }
            }
            log::debug!("{stale} (seq={})", token.sequence);
            return SummaryResolution::Discarded;
        }

        let workflow = self.workflows.entry(token.case_id.clone()).or_default();
        workflow.phase = SummaryPhase::Idle;

        match outcome {
            Ok(summary) => {
                if let Err(e) = store.attach_summary(&token.case_id, summary.clone()) {
                    log::debug!("summary for {} dropped: {e}", token.case_id);
                    return SummaryResolution::Discarded;
                }
                log::info!("summary applied: case={}", token.case_id);
                SummaryResolution::Applied(summary)
            }
            Err(e) => {
                log::warn!("summarize failed: case={}: {e}", token.case_id);
                workflow.last_error = Some(e.to_string());
                SummaryResolution::Failed(e)
            }
        }
    }

    /// Cancel interest in in-flight requests for cases no longer selected.
    pub fn on_selection_changed(&mut self, store: &CaseStore) {
        self.sync_generation(store);
        let selected = store.selected_id();
        for (case_id, workflow) in self.workflows.iter_mut() {
            if selected == Some(case_id.as_str()) {
                continue;
            }
            if let SummaryPhase::Requesting { sequence } = workflow.phase {
                log::debug!("summarize interest cancelled: case={case_id} seq={sequence}");
                workflow.phase = SummaryPhase::Idle;
            }
        }
    }

    pub fn phase(&self, store: &CaseStore, case_id: &str) -> SummaryPhase {
        self.workflow(store, case_id)
            .map(|w| w.phase)
            .unwrap_or(SummaryPhase::Idle)
    }

    pub fn last_error(&self, store: &CaseStore, case_id: &str) -> Option<&str> {
        self.workflow(store, case_id)
            .and_then(|w| w.last_error.as_deref())
    }

    /// Detail projection of the selected case.
    pub fn view(&self, store: &CaseStore) -> Option<CaseDetailView> {
        let case = store.current_selection()?;
        Some(CaseDetailView {
            summarizing:   matches!(self.phase(store, &case.case_id), SummaryPhase::Requesting { .. }),
            summary_error: self.last_error(store, &case.case_id).map(str::to_string),
            summary:       store.summary_for(&case.case_id).cloned(),
            ..CaseDetailView::from_case(case)
        })
    }

    fn check_current(&self, store: &CaseStore, token: &SummaryToken) -> DeskResult<()> {
        let in_flight = self
            .workflows
            .get(&token.case_id)
            .map(|w| w.phase == SummaryPhase::Requesting { sequence: token.sequence })
            .unwrap_or(false);
        let current = token.generation == store.generation()
            && store.is_selected(&token.case_id)
            && in_flight;
        if current {
            Ok(())
        } else {
            Err(DeskError::StaleResult { case_id: token.case_id.clone() })
        }
    }

    fn workflow(&self, store: &CaseStore, case_id: &str) -> Option<&SummaryWorkflow> {
        if self.generation != store.generation() {
            return None;
        }
        self.workflows.get(case_id)
    }

    fn sync_generation(&mut self, store: &CaseStore) {
        if self.generation != store.generation() {
            self.workflows.clear();
            self.generation = store.generation();
        }
    }
}

// ── Detail projection ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseDetailView {
    pub case_id:            CaseId,
    pub short_id:           String,
    pub customer_id:        EntityId,
    pub primary_account_id: EntityId,
    pub risk:               RiskClassification,
    pub risk_badge:         String,
    /// One "<amount> <currency>" label per currency, ordered by code.
    pub totals:             Vec<String>,
    pub signals:            Vec<SignalRow>,
    pub transactions:       Vec<TransactionRow>,
    pub summary:            Option<Summary>,
    pub summarizing:        bool,
    pub summary_error:      Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignalRow {
    pub name:        String,
    pub score_label: String,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRow {
    pub id:          EntityId,
    pub time:        String,
    pub amount:      String,
    pub merchant_id: EntityId,
    pub channel:     String,
    pub country:     String,
    pub device_id:   String,
    pub ip_address:  String,
}

impl CaseDetailView {
    fn from_case(case: &Case) -> Self {
        let risk = classify(case.risk_score);
        Self {
            case_id:            case.case_id.clone(),
            short_id:           case.short_id(),
            customer_id:        case.customer_id.clone(),
            primary_account_id: case.primary_account_id.clone(),
            risk_badge:         risk.badge(),
            risk,
            totals: case
                .totals_by_currency()
                .into_iter()
                .map(|(currency, amount)| format!("{amount:.2} {currency}"))
                .collect(),
            signals: case
                .signals
                .iter()
                .map(|s| SignalRow {
                    name:        s.name.clone(),
                    score_label: format!("{:.2}", s.score),
                    explanation: s.explanation.clone(),
                })
                .collect(),
            transactions: case
                .transactions
                .iter()
                .map(|t| TransactionRow {
                    id:          t.id.clone(),
                    time:        canonical_instant(&t.timestamp),
                    amount:      format!("{:.2} {}", t.amount, t.currency),
                    merchant_id: t.merchant_id.clone(),
                    channel:     t.channel.to_string(),
                    country:     or_absent(&t.country),
                    device_id:   or_absent(&t.device_id),
                    ip_address:  or_absent(&t.ip_address),
                })
                .collect(),
            summary:       None,
            summarizing:   false,
            summary_error: None,
        }
    }
}

fn or_absent(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| ABSENT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{instant_from_millis, Channel, Signal, Transaction};

    fn case(id: &str) -> Case {
        Case {
            case_id:            id.into(),
            customer_id:        "CUST-001".into(),
            primary_account_id: "ACC-123".into(),
            transactions: vec![Transaction {
                id:          format!("tx-{id}"),
                customer_id: "CUST-001".into(),
                account_id:  "ACC-123".into(),
                merchant_id: "M-COFFEE".into(),
                device_id:   None,
                ip_address:  Some("47.33.21.9".into()),
                amount:      4.75,
                currency:    "USD".into(),
                timestamp:   instant_from_millis(1_700_000_000_000).unwrap(),
                channel:     Channel::Pos,
                country:     None,
            }],
            risk_score: 0.65,
            signals: vec![Signal {
                name:        "velocity".into(),
                score:       0.9,
                explanation: "burst".into(),
            }],
        }
    }

    fn summary(text: &str) -> Summary {
        Summary {
            narrative:      text.into(),
            recommendation: "Escalate".into(),
        }
    }

    fn store_with(ids: &[&str]) -> CaseStore {
        let mut store = CaseStore::new();
        store.replace_cases(ids.iter().map(|id| case(id)).collect());
        store
    }

    #[test]
    fn success_attaches_summary_and_returns_to_idle() {
        let mut store = store_with(&["a"]);
        let mut vm = CaseDetailViewModel::new();

        let pending = vm.begin_summarize(&store).unwrap();
        assert_eq!(pending.request.case_id, "a");
        assert!(matches!(vm.phase(&store, "a"), SummaryPhase::Requesting { .. }));

        let res = vm.complete_summarize(&mut store, &pending.token, Ok(summary("done")));
        assert!(matches!(res, SummaryResolution::Applied(_)));
        assert_eq!(vm.phase(&store, "a"), SummaryPhase::Idle);
        assert_eq!(store.summary_for("a").unwrap().narrative, "done");
    }

    #[test]
    fn second_trigger_while_in_flight_is_rejected() {
        let store = store_with(&["a"]);
        let mut vm = CaseDetailViewModel::new();
        vm.begin_summarize(&store).unwrap();
        let err = vm.begin_summarize(&store).unwrap_err();
        assert!(matches!(err, DeskError::SummaryInFlight { .. }));
    }

    #[test]
    fn no_selection_is_an_error() {
        let store = CaseStore::new();
        let mut vm = CaseDetailViewModel::new();
        assert!(matches!(vm.begin_summarize(&store), Err(DeskError::NoSelection)));
    }

    #[test]
    fn result_for_deselected_case_is_discarded() {
        let mut store = store_with(&["a", "b"]);
        let mut vm = CaseDetailViewModel::new();

        let pending = vm.begin_summarize(&store).unwrap();
        store.select_case("b").unwrap();
        vm.on_selection_changed(&store);
        assert_eq!(vm.phase(&store, "a"), SummaryPhase::Idle);

        let res = vm.complete_summarize(&mut store, &pending.token, Ok(summary("late")));
        assert!(matches!(res, SummaryResolution::Discarded));
        assert!(store.summary_for("a").is_none());
        assert!(store.summary_for("b").is_none());
    }

    #[test]
    fn superseded_request_loses_to_latest() {
        let mut store = store_with(&["a", "b"]);
        let mut vm = CaseDetailViewModel::new();

        let first = vm.begin_summarize(&store).unwrap();
        store.select_case("b").unwrap();
        vm.on_selection_changed(&store);
        store.select_case("a").unwrap();
        vm.on_selection_changed(&store);
        let second = vm.begin_summarize(&store).unwrap();

        let res = vm.complete_summarize(&mut store, &first.token, Ok(summary("old")));
        assert!(matches!(res, SummaryResolution::Discarded));
        assert!(matches!(vm.phase(&store, "a"), SummaryPhase::Requesting { .. }));

        let res = vm.complete_summarize(&mut store, &second.token, Ok(summary("new")));
        assert!(matches!(res, SummaryResolution::Applied(_)));
        assert_eq!(store.summary_for("a").unwrap().narrative, "new");
    }

    #[test]
    fn failure_is_visible_until_next_request() {
        let mut store = store_with(&["a"]);
        let mut vm = CaseDetailViewModel::new();

        let pending = vm.begin_summarize(&store).unwrap();
        let failure = DeskError::ServerError {
            endpoint: "summary".into(),
            status:   500,
            message:  "boom".into(),
        };
        let res = vm.complete_summarize(&mut store, &pending.token, Err(failure));
        assert!(matches!(res, SummaryResolution::Failed(DeskError::ServerError { status: 500, .. })));
        assert!(vm.view(&store).unwrap().summary_error.unwrap().contains("boom"));

        vm.begin_summarize(&store).unwrap();
        assert!(vm.view(&store).unwrap().summary_error.is_none());
    }

    #[test]
    fn replacement_invalidates_in_flight_tokens() {
        let mut store = store_with(&["a"]);
        let mut vm = CaseDetailViewModel::new();
        let pending = vm.begin_summarize(&store).unwrap();

        store.replace_cases(vec![case("a")]);
        let res = vm.complete_summarize(&mut store, &pending.token, Ok(summary("old set")));
        assert!(matches!(res, SummaryResolution::Discarded));
        assert!(store.summary_for("a").is_none());
        assert_eq!(vm.phase(&store, "a"), SummaryPhase::Idle);
    }

    #[test]
    fn view_renders_placeholders_and_labels() {
        let store = store_with(&["abcdefghijk"]);
        let vm = CaseDetailViewModel::new();
        let view = vm.view(&store).unwrap();

        assert_eq!(view.short_id, "abcdefgh");
        assert_eq!(view.risk_badge, "High (0.65)");
        assert_eq!(view.signals[0].score_label, "0.90");
        let tx = &view.transactions[0];
        assert_eq!(tx.amount, "4.75 USD");
        assert_eq!(view.totals, ["4.75 USD"]);
        assert_eq!(tx.channel, "POS");
        assert_eq!(tx.country, "—");
        assert_eq!(tx.device_id, "—");
        assert_eq!(tx.ip_address, "47.33.21.9");
        assert_eq!(tx.time, "2023-11-14T22:13:20.000Z");
        assert!(!view.summarizing);
    }
}
