//! Error types for the assistant gateway

use thiserror::Error;

/// Errors that can occur while handling a query end to end
#[derive(Debug, Error)]
pub enum QueryError {
    /// Malformed or missing request input
    #[error("Validation error: {0}")]
    Validation(String),

    /// A tool call's argument payload could not be decoded
    #[error("Tool argument decode error: {0}")]
    ToolArguments(String),

    /// A tool call named a function the registry doesn't know
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Upstream service error (assistant or search backend)
    #[error("Upstream service error: {0}")]
    Upstream(#[from] ApiError),

    /// The remote run reported a failed status
    #[error("Run failed: {0}")]
    RunFailed(serde_json::Value),

    /// The remote run did not settle before the configured deadline
    #[error("Run did not settle within {0}s")]
    Timeout(u64),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl QueryError {
    /// Stable machine-readable kind, used in error bodies and metric labels
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::Validation(_) => "validation",
            QueryError::ToolArguments(_) => "tool_arguments",
            QueryError::UnknownTool(_) => "unknown_tool",
            QueryError::Upstream(_) => "upstream",
            QueryError::RunFailed(_) => "run_failed",
            QueryError::Timeout(_) => "timeout",
            QueryError::Internal(_) => "internal",
        }
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::Internal(format!("Serialization error: {}", err))
    }
}

/// Errors specific to outbound HTTP calls against a remote service
#[derive(Debug, Error)]
pub enum ApiError {
    /// Remote service returned a non-success status
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Authentication error (missing or rejected credentials)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Network(format!("Connection error: {}", err))
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Result type alias for query handling
pub type QueryResult<T> = Result<T, QueryError>;

/// Result type alias for outbound API calls
pub type ApiResult<T> = Result<T, ApiError>;
