//! Error types for the adaptive RAG pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::graph::Node;
use crate::types::Trace;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Empty or malformed question; the run never starts
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A collaborator returned a value outside its declared shape
    #[error("Upstream contract violation at {node}: {detail}")]
    UpstreamContractViolation { node: Node, detail: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Document store or web search error
    #[error("Search error: {0}")]
    Search(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML config error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a contract violation attributed to `node`
    pub fn contract(node: Node, detail: impl Into<String>) -> Self {
        Self::UpstreamContractViolation {
            node,
            detail: detail.into(),
        }
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create a search error
    pub fn search(message: impl Into<String>) -> Self {
        Self::Search(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            Error::UpstreamContractViolation { .. } => {
                (StatusCode::BAD_GATEWAY, "upstream_contract_violation")
            }
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            Error::Llm(_) => (StatusCode::SERVICE_UNAVAILABLE, "llm_error"),
            Error::Search(_) => (StatusCode::BAD_GATEWAY, "search_error"),
            Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
            Error::Json(_) => (StatusCode::BAD_REQUEST, "json_error"),
            Error::Toml(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

/// A run that started and then failed, with the trace up to the failure
#[derive(Debug, Error)]
#[error("{error}")]
pub struct RunFailure {
    #[source]
    pub error: Error,
    pub trace: Trace,
}

impl RunFailure {
    pub fn new(error: Error, trace: Trace) -> Self {
        Self { error, trace }
    }

    /// Node that was executing when the run failed, if any node ran
    pub fn failed_node(&self) -> Option<Node> {
        match &self.error {
            Error::UpstreamContractViolation { node, .. } => Some(*node),
            _ => self.trace.last().map(|event| event.node),
        }
    }
}

impl From<Error> for RunFailure {
    fn from(error: Error) -> Self {
        Self::new(error, Trace::default())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type) = self.parts();

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

impl IntoResponse for RunFailure {
    fn into_response(self) -> Response {
        let (status, error_type) = self.error.parts();

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.error.to_string(),
                "node": self.failed_node().map(|n| n.to_string()),
            },
            "trace": self.trace,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::invalid_input("empty").parts().0, StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::contract(Node::Grade, "maybe").parts().0,
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            Error::llm("connection refused").parts(),
            (StatusCode::SERVICE_UNAVAILABLE, "llm_error")
        );
        assert_eq!(Error::search("tavily 500").parts().0, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_failed_node_falls_back_to_last_event() {
        let failure = RunFailure::from(Error::llm("down"));
        assert_eq!(failure.failed_node(), None);

        let failure = RunFailure::new(
            Error::contract(Node::Route, "unknown datasource"),
            Trace::default(),
        );
        assert_eq!(failure.failed_node(), Some(Node::Route));
    }
}
