//! Error types for suiact.

use std::time::Duration;

use serde::Serialize;

use crate::chain::network::SuiNetwork;
use crate::intent::validate::ValidationReport;

/// Top-level error type for collaborator and setup failures.
///
/// Business outcomes of a pipeline run never surface through this type; they
/// are carried by [`PipelineFailure`] and delivered as an outcome.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Token registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Completion service errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Completion timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Token registry errors. A reference that simply does not exist is not an
/// error; registries return `Ok(None)` for it.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("RPC {method} failed: {reason}")]
    Rpc { method: String, reason: String },

    #[error("Malformed metadata for {reference}: {reason}")]
    MalformedMetadata { reference: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Signing and submission errors.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("Signer failed: {0}")]
    Signer(String),

    #[error("RPC {method} failed: {reason}")]
    Rpc { method: String, reason: String },

    #[error("Invalid transaction call: {0}")]
    InvalidCall(String),

    #[error("Submission timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Pipeline stage, used for status logging and failure attribution.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Availability,
    Extraction,
    Validation,
    NetworkGate,
    Resolution,
    Execution,
    Reporting,
}

impl PipelineStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Availability => "availability",
            Self::Extraction => "extraction",
            Self::Validation => "validation",
            Self::NetworkGate => "network_gate",
            Self::Resolution => "resolution",
            Self::Execution => "execution",
            Self::Reporting => "reporting",
        }
    }
}

/// Stage state for pipeline status logging.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StageState {
    Started,
    Completed,
    Failed,
    Skipped,
}

/// Which side of a two-token operation a reference belongs to.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenSide {
    From,
    Destination,
}

impl TokenSide {
    pub fn label(self) -> &'static str {
        match self {
            Self::From => "from token",
            Self::Destination => "destination token",
        }
    }
}

/// A token reference the registry could not resolve.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UnresolvedToken {
    pub side: TokenSide,
    pub reference: String,
}

/// Categorized business failure of one pipeline run.
///
/// Every variant is caught at its originating stage and turned into an
/// [`crate::pipeline::Outcome`]; none of them escape the pipeline boundary.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PipelineFailure {
    #[error("{action} is not configured (set {})", .missing.join(" and "))]
    ActionUnavailable {
        action: &'static str,
        missing: Vec<&'static str>,
    },

    #[error("extraction failed: {reason}")]
    Extraction { reason: String },

    #[error("invalid intent: {report}")]
    InvalidIntent {
        report: ValidationReport,
        candidate: Option<serde_json::Value>,
        /// `Validation` for schema and policy checks, `Resolution` for
        /// amounts that only fail once token scales are known.
        stage: PipelineStage,
    },

    #[error("network {network} is not supported (allowed: {})", join_networks(.allowed))]
    UnsupportedNetwork {
        network: SuiNetwork,
        allowed: Vec<SuiNetwork>,
        parsed: serde_json::Value,
    },

    #[error("token not found: {}", describe_unresolved(.unresolved))]
    TokenNotFound {
        unresolved: Vec<UnresolvedToken>,
        intent: serde_json::Value,
    },

    #[error("execution failed: {message}")]
    Execution {
        message: String,
        intent: Option<serde_json::Value>,
    },
}

fn join_networks(networks: &[SuiNetwork]) -> String {
    networks
        .iter()
        .map(|n| n.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn describe_unresolved(unresolved: &[UnresolvedToken]) -> String {
    unresolved
        .iter()
        .map(|u| format!("{}: {} not found", u.side.label(), u.reference))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Structured failure descriptor attached to failed outcomes.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorPayload {
    pub stage: PipelineStage,
    pub code: &'static str,
    pub retryable: bool,
    pub message: String,
}

impl PipelineFailure {
    /// Stage at which this failure originated. Matches the stage the
    /// pipeline logs as failed.
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::ActionUnavailable { .. } => PipelineStage::Availability,
            Self::Extraction { .. } => PipelineStage::Extraction,
            Self::InvalidIntent { stage, .. } => *stage,
            Self::UnsupportedNetwork { .. } => PipelineStage::NetworkGate,
            Self::TokenNotFound { .. } => PipelineStage::Resolution,
            Self::Execution { .. } => PipelineStage::Execution,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::ActionUnavailable { .. } => "action.unavailable",
            Self::Extraction { .. } => "intent.extraction_failed",
            Self::InvalidIntent { .. } => "intent.invalid",
            Self::UnsupportedNetwork { .. } => "policy.unsupported_network",
            Self::TokenNotFound { .. } => "resolution.token_not_found",
            Self::Execution { .. } => "execution.failed",
        }
    }

    /// Whether a fresh invocation with the same input could plausibly succeed.
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Extraction { .. } | Self::Execution { .. })
    }

    pub fn to_error_payload(&self) -> ErrorPayload {
        ErrorPayload {
            stage: self.stage(),
            code: self.code(),
            retryable: self.retryable(),
            message: self.to_string(),
        }
    }

    /// Partially resolved intent carried for caller-side debugging, if any.
    pub fn intent(&self) -> Option<&serde_json::Value> {
        match self {
            Self::ActionUnavailable { .. } | Self::Extraction { .. } => None,
            Self::InvalidIntent { candidate, .. } => candidate.as_ref(),
            Self::UnsupportedNetwork { parsed, .. } => Some(parsed),
            Self::TokenNotFound { intent, .. } => Some(intent),
            Self::Execution { intent, .. } => intent.as_ref(),
        }
    }
}

impl From<LlmError> for PipelineFailure {
    fn from(err: LlmError) -> Self {
        Self::Extraction {
            reason: err.to_string(),
        }
    }
}

/// Result type alias for suiact.
pub type Result<T> = std::result::Result<T, Error>;
