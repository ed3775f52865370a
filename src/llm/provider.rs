//! Completion service seam.

use async_trait::async_trait;

use crate::error::LlmError;

/// One structured-extraction request.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Fully rendered prompt, user text included.
    pub prompt: String,
    /// JSON Schema describing the object the model must return.
    pub schema: serde_json::Value,
}

/// Completion service with structured output.
///
/// Returns whatever JSON value the model produced; checking it against the
/// schema happens downstream.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn extract(&self, request: &ExtractionRequest) -> Result<serde_json::Value, LlmError>;
}
