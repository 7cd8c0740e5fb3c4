use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Network failure calling {endpoint}: {reason}")]
    NetworkFailure { endpoint: String, reason: String },

    #[error("Service error from {endpoint}: HTTP {status}: {message}")]
    ServerError {
        endpoint: String,
        status:   u16,
        message:  String,
    },

    #[error("Malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    #[error("Case '{case_id}' not found")]
    NotFound { case_id: String },

    /// Internal only. Dropped by the detail workflow, never shown to the analyst.
    #[error("Stale result for case '{case_id}' discarded")]
    StaleResult { case_id: String },

    #[error("A summary request for case '{case_id}' is already in flight")]
    SummaryInFlight { case_id: String },

    #[error("No case is selected")]
    NoSelection,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DeskError {
    /// True for the three gateway failure kinds.
    pub fn is_gateway_failure(&self) -> bool {
        matches!(
            self,
            Self::NetworkFailure { .. } | Self::ServerError { .. } | Self::MalformedResponse { .. }
        )
    }
}

pub type DeskResult<T> = Result<T, DeskError>;
