//! Service gateways — the only way the desk talks to the outside world.
//!
//! RULE: every failure comes back as a typed `DeskError`
//! (NetworkFailure / ServerError / MalformedResponse). Nothing is dropped.

mod http;
mod validate;

pub use http::HttpServiceGateway;
pub use validate::validate_cases;

use crate::{
    error::DeskResult,
    model::{Case, Summary, Transaction},
    request::CaseSummaryRequest,
};
use async_trait::async_trait;

/// Case detection. Safe to retry: the same batch yields an equivalent case set.
#[async_trait]
pub trait AnalysisGateway: Send + Sync {
    async fn analyze(&self, transactions: &[Transaction]) -> DeskResult<Vec<Case>>;
}

/// Narrative generation for a single case.
#[async_trait]
pub trait SummaryGateway: Send + Sync {
    async fn summarize(&self, request: &CaseSummaryRequest) -> DeskResult<Summary>;
}
