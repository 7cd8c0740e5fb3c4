//! HTTP implementation of both gateways against the fraud analysis service.

use super::{validate_cases, AnalysisGateway, SummaryGateway};
use crate::{
    config::{self, DeskConfig},
    error::{DeskError, DeskResult},
    model::{Case, Summary, Transaction},
    request::CaseSummaryRequest,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Error body shape used by the service: `{"error": "...", "details": ...}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct HealthBody {
    status: String,
}

pub struct HttpServiceGateway {
    client: reqwest::Client,
    config: DeskConfig,
}

impl HttpServiceGateway {
    pub fn new(config: DeskConfig) -> DeskResult<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| DeskError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Build against the process-wide installed config.
    pub fn from_installed() -> DeskResult<Self> {
        Self::new(config::installed()?.clone())
    }

    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    /// `GET /health`. Ok only when the service answers `{"status": "ok"}`.
    pub async fn health(&self) -> DeskResult<()> {
        let url = self.config.health_url();
        let request_id = Uuid::new_v4();
        let exchange = async {
            let resp = self
                .client
                .get(&url)
                .header(REQUEST_ID_HEADER, request_id.to_string())
                .send()
                .await?;
            let status = resp.status();
            let body = resp.bytes().await?.to_vec();
            Ok::<_, reqwest::Error>((status, body))
        };
        let (status, body) = self.bounded(&url, exchange).await?;
        let health: HealthBody = decode(&url, status, &body)?;
        if health.status != "ok" {
            return Err(DeskError::ServerError {
                endpoint: url,
                status:   status.as_u16(),
                message:  format!("service reports status '{}'", health.status),
            });
        }
        Ok(())
    }

    async fn post_json<B, R>(&self, url: &str, body: &B) -> DeskResult<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let request_id = Uuid::new_v4();
        log::debug!("POST {url} request_id={request_id}");

        let exchange = async {
            let resp = self
                .client
                .post(url)
                .header(REQUEST_ID_HEADER, request_id.to_string())
                .json(body)
                .send()
                .await?;
            let status = resp.status();
            let body = resp.bytes().await?.to_vec();
            Ok::<_, reqwest::Error>((status, body))
        };
        let (status, bytes) = self.bounded(url, exchange).await?;
        log::debug!("POST {url} request_id={request_id} -> {status}");
        decode(url, status, &bytes)
    }

    /// Run a whole request/response exchange under the configured deadline.
    async fn bounded<F>(&self, url: &str, exchange: F) -> DeskResult<(StatusCode, Vec<u8>)>
    where
        F: std::future::Future<Output = Result<(StatusCode, Vec<u8>), reqwest::Error>>,
    {
        match tokio::time::timeout(self.config.timeout(), exchange).await {
            Ok(Ok(done)) => Ok(done),
            Ok(Err(e)) => Err(network_failure(url, &e, self.config.timeout_ms)),
            Err(_elapsed) => Err(timed_out(url, self.config.timeout_ms)),
        }
    }
}

fn timed_out(url: &str, timeout_ms: u64) -> DeskError {
    DeskError::NetworkFailure {
        endpoint: url.to_string(),
        reason:   format!("timed out after {timeout_ms}ms"),
    }
}

fn network_failure(url: &str, e: &reqwest::Error, timeout_ms: u64) -> DeskError {
    if e.is_timeout() {
        return timed_out(url, timeout_ms);
    }
    DeskError::NetworkFailure {
        endpoint: url.to_string(),
        reason:   e.to_string(),
    }
}

fn decode<R: DeserializeOwned>(url: &str, status: StatusCode, body: &[u8]) -> DeskResult<R> {
    if !status.is_success() {
        let message = match serde_json::from_slice::<ErrorBody>(body) {
            Ok(err) => err.error,
            Err(_) => String::from_utf8_lossy(body)
                .chars()
                .take(MAX_ERROR_BODY_CHARS)
                .collect(),
        };
        log::warn!("{url} returned {status}: {message}");
        return Err(DeskError::ServerError {
            endpoint: url.to_string(),
            status:   status.as_u16(),
            message,
        });
    }
    serde_json::from_slice(body).map_err(|e| DeskError::MalformedResponse {
        endpoint: url.to_string(),
        reason:   e.to_string(),
    })
}

#[async_trait]
impl AnalysisGateway for HttpServiceGateway {
    async fn analyze(&self, transactions: &[Transaction]) -> DeskResult<Vec<Case>> {
        let url = self.config.analyze_url();
        let cases: Vec<Case> = self.post_json(&url, transactions).await?;
        let cases = validate_cases(&url, cases)?;
        log::info!("analyze: {} transactions -> {} cases", transactions.len(), cases.len());
        Ok(cases)
    }
}

#[async_trait]
impl SummaryGateway for HttpServiceGateway {
    async fn summarize(&self, request: &CaseSummaryRequest) -> DeskResult<Summary> {
        let url = self.config.summarize_url();
        let summary: Summary = self.post_json(&url, request).await?;
        log::info!("summarize: case {} narrative received", request.case_id);
        Ok(summary)
    }
}
