//! Shared fixtures: scripted gateways and case builders.

#![allow(dead_code)]

use async_trait::async_trait;
use fraud_desk_core::{
    error::{DeskError, DeskResult},
    gateway::{AnalysisGateway, SummaryGateway},
    model::{Case, Signal, Summary, Transaction},
    request::CaseSummaryRequest,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, Semaphore};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Holds gateway calls until the test releases them.
pub struct Gate {
    pub started: Notify,
    release:     Semaphore,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            started: Notify::new(),
            release: Semaphore::new(0),
        })
    }

    pub fn release(&self, calls: usize) {
        self.release.add_permits(calls);
    }

    async fn pass(&self) -> DeskResult<()> {
        self.started.notify_one();
        let permit = self.release.acquire().await.map_err(|e| DeskError::NetworkFailure {
            endpoint: "gate".into(),
            reason:   e.to_string(),
        })?;
        permit.forget();
        Ok(())
    }
}

/// Analysis gateway that answers from a script, one response per call.
pub struct ScriptedAnalysis {
    responses: Mutex<VecDeque<DeskResult<Vec<Case>>>>,
    gate:      Option<Arc<Gate>>,
    pub seen:  Mutex<Vec<Vec<Transaction>>>,
}

impl ScriptedAnalysis {
    pub fn new(responses: Vec<DeskResult<Vec<Case>>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            gate:      None,
            seen:      Mutex::new(Vec::new()),
        })
    }

    pub fn gated(responses: Vec<DeskResult<Vec<Case>>>, gate: Arc<Gate>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            gate:      Some(gate),
            seen:      Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl AnalysisGateway for ScriptedAnalysis {
    async fn analyze(&self, transactions: &[Transaction]) -> DeskResult<Vec<Case>> {
        self.seen.lock().unwrap().push(transactions.to_vec());
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()));
        if let Some(gate) = &self.gate {
            gate.pass().await?;
        }
        response
    }
}

/// Summary gateway that echoes the case id back, optionally gated.
pub struct EchoSummary {
    gate:      Option<Arc<Gate>>,
    fail_with: Mutex<Option<DeskError>>,
    pub calls: AtomicUsize,
    pub seen:  Mutex<Vec<CaseSummaryRequest>>,
}

impl EchoSummary {
    pub fn new() -> Arc<Self> {
        Self::build(None)
    }

    pub fn gated(gate: Arc<Gate>) -> Arc<Self> {
        Self::build(Some(gate))
    }

    fn build(gate: Option<Arc<Gate>>) -> Arc<Self> {
        Arc::new(Self {
            gate,
            fail_with: Mutex::new(None),
            calls:     AtomicUsize::new(0),
            seen:      Mutex::new(Vec::new()),
        })
    }

    /// Make the next call fail.
    pub fn fail_next(&self, error: DeskError) {
        *self.fail_with.lock().unwrap() = Some(error);
    }
}

#[async_trait]
impl SummaryGateway for EchoSummary {
    async fn summarize(&self, request: &CaseSummaryRequest) -> DeskResult<Summary> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(request.clone());
        let failure = self.fail_with.lock().unwrap().take();
        if let Some(gate) = &self.gate {
            gate.pass().await?;
        }
        if let Some(e) = failure {
            return Err(e);
        }
        Ok(Summary {
            narrative:      format!("narrative for {}", request.case_id),
            recommendation: "Restrict the account and escalate to Level 2.".into(),
        })
    }
}

pub fn velocity_signal(score: f64) -> Signal {
    Signal {
        name:        "velocity".into(),
        score,
        explanation: "Two high-value web purchases three minutes apart".into(),
    }
}

pub fn case_for(case_id: &str, customer_id: &str, risk_score: f64, transactions: Vec<Transaction>) -> Case {
    let account = transactions
        .first()
        .map(|t| t.account_id.clone())
        .unwrap_or_else(|| "ACC-000".into());
    Case {
        case_id:            case_id.into(),
        customer_id:        customer_id.into(),
        primary_account_id: account,
        transactions,
        risk_score,
        signals:            vec![velocity_signal(risk_score)],
    }
}

pub fn server_error(message: &str) -> DeskError {
    DeskError::ServerError {
        endpoint: "http://stub/api/transactions/analyze".into(),
        status:   500,
        message:  message.into(),
    }
}
