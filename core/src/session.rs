//! The desk session — single writer over the case store and view models.
//!
//! WORKFLOWS:
//!   analyze    — send a batch, replace the case set on success
//!   select     — move the selection, cancel interest in the old case's summary
//!   summarize  — request a narrative for the selected case
//!
//! RULES:
//!   - All state lives behind one async lock. Nothing mutates it elsewhere.
//!   - The lock is never held across a gateway call; a select can land
//!     while a summarize or analyze is in flight.
//!   - Only the most recently issued analyze may replace the case set.
//!   - A failed analyze leaves cases and selection exactly as they were and
//!     sets a visible Failed status.
//!   - Every case set is validated here before it reaches the store,
//!     whichever gateway produced it.

use crate::{
    case_detail::{CaseDetailViewModel, PendingSummary, SummaryResolution},
    case_store::CaseStore,
    command::AnalystCommand,
    error::DeskResult,
    event::{ActivityLog, DeskEvent},
    gateway::{validate_cases, AnalysisGateway, SummaryGateway},
    model::{Summary, Transaction},
    sample_data::sample_transactions,
    snapshot::DeskSnapshot,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Endpoint label for case sets rejected at the session boundary.
const ANALYSIS_SOURCE: &str = "analysis gateway";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisStatus {
    Idle,
    Analyzing,
    Ready { case_count: usize },
    Failed { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Replaced { case_count: usize },
    /// A newer analyze was issued before this one finished.
    Superseded,
}

#[derive(Debug)]
pub struct DeskState {
    pub store:    CaseStore,
    pub detail:   CaseDetailViewModel,
    pub analysis: AnalysisStatus,
    pub activity: ActivityLog,
    analysis_seq: u64,
}

impl Default for DeskState {
    fn default() -> Self {
        Self {
            store:        CaseStore::new(),
            detail:       CaseDetailViewModel::new(),
            analysis:     AnalysisStatus::Idle,
            activity:     ActivityLog::default(),
            analysis_seq: 0,
        }
    }
}

#[derive(Clone)]
pub struct DeskSession {
    state:    Arc<Mutex<DeskState>>,
    analysis: Arc<dyn AnalysisGateway>,
    summary:  Arc<dyn SummaryGateway>,
}

impl DeskSession {
    pub fn new(analysis: Arc<dyn AnalysisGateway>, summary: Arc<dyn SummaryGateway>) -> Self {
        Self {
            state: Arc::new(Mutex::new(DeskState::default())),
            analysis,
            summary,
        }
    }

    /// One service object answering both contracts.
    pub fn with_gateway<G>(gateway: Arc<G>) -> Self
    where
        G: AnalysisGateway + SummaryGateway + 'static,
    {
        Self::new(gateway.clone(), gateway)
    }

    pub async fn analyze(&self, transactions: Vec<Transaction>) -> DeskResult<AnalysisOutcome> {
        let request_seq = self.begin_analyze(&transactions).await;
        self.finish_analyze(request_seq, transactions).await
    }

    async fn begin_analyze(&self, transactions: &[Transaction]) -> u64 {
        let mut state = self.state.lock().await;
        state.analysis_seq += 1;
        let seq = state.analysis_seq;
        state.analysis = AnalysisStatus::Analyzing;
        state.activity.record(DeskEvent::AnalysisStarted {
            request_seq:       seq,
            transaction_count: transactions.len(),
        });
        log::info!("analyze #{seq}: {} transactions", transactions.len());
        seq
    }

    async fn finish_analyze(
        &self,
        request_seq: u64,
        transactions: Vec<Transaction>,
    ) -> DeskResult<AnalysisOutcome> {
        let outcome = self
            .analysis
            .analyze(&transactions)
            .await
            .and_then(|cases| validate_cases(ANALYSIS_SOURCE, cases));

        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        if request_seq != state.analysis_seq {
            log::debug!("analyze #{request_seq} superseded by #{}", state.analysis_seq);
            state.activity.record(DeskEvent::AnalysisSuperseded { request_seq });
            return Ok(AnalysisOutcome::Superseded);
        }

        match outcome {
            Ok(cases) => {
                let case_count = cases.len();
                state.store.replace_cases(cases);
                state.detail.on_selection_changed(&state.store);
                state.analysis = AnalysisStatus::Ready { case_count };
                state.activity.record(DeskEvent::CasesReplaced {
                    request_seq,
                    generation: state.store.generation(),
                    case_count,
                });
                log::info!("analyze #{request_seq}: {case_count} cases loaded");
                Ok(AnalysisOutcome::Replaced { case_count })
            }
            Err(e) => {
                log::warn!("analyze #{request_seq} failed: {e}");
                state.analysis = AnalysisStatus::Failed { message: e.to_string() };
                state.activity.record(DeskEvent::AnalysisFailed {
                    request_seq,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Analyze the canned demo batch.
    pub async fn load_sample(&self) -> DeskResult<AnalysisOutcome> {
        self.analyze(sample_transactions(Utc::now())).await
    }

    pub async fn select_case(&self, case_id: &str) -> DeskResult<()> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        state.store.select_case(case_id)?;
        state.detail.on_selection_changed(&state.store);
        state.activity.record(DeskEvent::CaseSelected { case_id: case_id.to_string() });
        Ok(())
    }

    /// Summarize the selected case.
    ///
    /// `Ok(Some)`: summary attached. `Ok(None)`: the analyst moved on and
    /// the answer was dropped. `Err`: the request could not start or failed.
    pub async fn summarize_selected(&self) -> DeskResult<Option<Summary>> {
        let pending = self.begin_summarize().await?;
        self.finish_summarize(pending).await
    }

    async fn begin_summarize(&self) -> DeskResult<PendingSummary> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let pending = state.detail.begin_summarize(&state.store)?;
        state.activity.record(DeskEvent::SummaryRequested {
            case_id:  pending.token.case_id.clone(),
            sequence: pending.token.sequence,
        });
        Ok(pending)
    }

    async fn finish_summarize(&self, pending: PendingSummary) -> DeskResult<Option<Summary>> {
        let outcome = self.summary.summarize(&pending.request).await;

        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let token = &pending.token;
        match state.detail.complete_summarize(&mut state.store, token, outcome) {
            SummaryResolution::Applied(summary) => {
                state.activity.record(DeskEvent::SummaryApplied {
                    case_id:  token.case_id.clone(),
                    sequence: token.sequence,
                });
                Ok(Some(summary))
            }
            SummaryResolution::Discarded => {
                state.activity.record(DeskEvent::SummaryDiscarded {
                    case_id:  token.case_id.clone(),
                    sequence: token.sequence,
                });
                Ok(None)
            }
            SummaryResolution::Failed(e) => {
                state.activity.record(DeskEvent::SummaryFailed {
                    case_id:  token.case_id.clone(),
                    sequence: token.sequence,
                    error:    e.to_string(),
                });
                Err(e)
            }
        }
    }

    pub async fn dispatch(&self, command: AnalystCommand) -> DeskResult<()> {
        self.begin(command).await?.finish().await
    }

    /// Apply the synchronous part of a command.
    ///
    /// When this returns, the state already shows the command as started
    /// (Analyzing, or the case's summary Requesting). The service round trip,
    /// if any, happens in `InFlight::finish`.
    pub async fn begin(&self, command: AnalystCommand) -> DeskResult<InFlight> {
        let work = match command {
            AnalystCommand::LoadSample => {
                let transactions = sample_transactions(Utc::now());
                let request_seq = self.begin_analyze(&transactions).await;
                Work::Analyze { request_seq, transactions }
            }
            AnalystCommand::Analyze { transactions } => {
                let request_seq = self.begin_analyze(&transactions).await;
                Work::Analyze { request_seq, transactions }
            }
            AnalystCommand::Select { case_id } => {
                self.select_case(&case_id).await?;
                Work::Done
            }
            AnalystCommand::Summarize => Work::Summarize(self.begin_summarize().await?),
            AnalystCommand::GetState | AnalystCommand::Quit => Work::Done,
        };
        Ok(InFlight {
            session: self.clone(),
            work,
        })
    }

    pub async fn snapshot(&self) -> DeskSnapshot {
        let state = self.state.lock().await;
        DeskSnapshot::capture(&state)
    }

    /// Run `f` against the current state under the lock. For read-only views.
    pub async fn inspect<R>(&self, f: impl FnOnce(&DeskState) -> R) -> R {
        let state = self.state.lock().await;
        f(&state)
    }
}

enum Work {
    Analyze {
        request_seq:  u64,
        transactions: Vec<Transaction>,
    },
    Summarize(PendingSummary),
    Done,
}

/// A command whose synchronous part has been applied.
#[must_use = "the service round trip only happens in finish()"]
pub struct InFlight {
    session: DeskSession,
    work:    Work,
}

impl InFlight {
    /// True when `finish` will wait on a service.
    pub fn is_remote(&self) -> bool {
        !matches!(self.work, Work::Done)
    }

    pub async fn finish(self) -> DeskResult<()> {
        match self.work {
            Work::Analyze { request_seq, transactions } => self
                .session
                .finish_analyze(request_seq, transactions)
                .await
                .map(|_| ()),
            Work::Summarize(pending) => self.session.finish_summarize(pending).await.map(|_| ()),
            Work::Done => Ok(()),
        }
    }
}
