//! Terminal outcome of a run and the port it is delivered through.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::error::ErrorPayload;

/// Caller-visible result of one pipeline invocation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Outcome {
    pub run_id: Uuid,
    pub action: &'static str,
    pub success: bool,
    /// Human-readable message for the conversation.
    pub text: String,
    /// Success details, or the intent as far as it was parsed.
    pub content: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
    pub finished_at: DateTime<Utc>,
}

/// Caller-supplied delivery port.
///
/// Owned and consumed by [`Callback::deliver`], so it can fire at most once;
/// the pipeline always calls it, so it fires exactly once per run.
pub struct Callback {
    deliver: Box<dyn FnOnce(Outcome) + Send>,
}

impl Callback {
    pub fn new(deliver: impl FnOnce(Outcome) + Send + 'static) -> Self {
        Self {
            deliver: Box::new(deliver),
        }
    }

    /// Callback backed by a oneshot channel.
    pub fn channel() -> (Self, oneshot::Receiver<Outcome>) {
        let (tx, rx) = oneshot::channel();
        let callback = Self::new(move |outcome| {
            if tx.send(outcome).is_err() {
                tracing::debug!("outcome receiver dropped before delivery");
            }
        });
        (callback, rx)
    }

    /// Callback that discards the outcome.
    pub fn ignore() -> Self {
        Self::new(|_| {})
    }

    pub fn deliver(self, outcome: Outcome) {
        (self.deliver)(outcome)
    }
}

impl std::fmt::Debug for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callback").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome() -> Outcome {
        Outcome {
            run_id: Uuid::new_v4(),
            action: "MINT_NFT",
            success: true,
            text: "done".to_string(),
            content: serde_json::json!({}),
            error: None,
            finished_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn channel_callback_forwards_the_outcome() {
        let (callback, rx) = Callback::channel();
        let sent = outcome();
        callback.deliver(sent.clone());
        assert_eq!(rx.await.unwrap(), sent);
    }

    #[test]
    fn delivery_survives_a_dropped_receiver() {
        let (callback, rx) = Callback::channel();
        drop(rx);
        callback.deliver(outcome());
    }

    #[test]
    fn successful_outcomes_omit_the_error_field() {
        let value = serde_json::to_value(outcome()).unwrap();
        assert!(value.get("error").is_none());
        assert_eq!(value["action"], "MINT_NFT");
    }
}
