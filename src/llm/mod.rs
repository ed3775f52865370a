//! Completion service integration.

mod http;
pub mod json;
mod provider;

pub use http::{ApiFormat, HttpCompletionClient};
pub use provider::{CompletionProvider, ExtractionRequest};
