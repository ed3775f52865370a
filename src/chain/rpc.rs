//! Minimal JSON-RPC 2.0 client for a Sui fullnode.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{ChainError, RegistryError};

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("response carried neither result nor error")]
    EmptyResponse,

    #[error("failed to decode result: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Clone)]
pub struct JsonRpcClient {
    http: Client,
    url: String,
}

impl JsonRpcClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RpcError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Call `method` and decode its `result`. A JSON `null` result decodes
    /// into `T` as-is, so `Option<_>` targets see `None`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, RpcError> {
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        tracing::debug!(method, url = %self.url, "sending JSON-RPC request");

        let response = self.http.post(&self.url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RpcError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let mut envelope: serde_json::Value = response.json().await?;
        if let Some(err) = envelope.get("error").filter(|e| !e.is_null()) {
            let err: RpcErrorBody = serde_json::from_value(err.clone())?;
            return Err(RpcError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        // `result: null` is a valid answer (e.g. unknown coin type), so test
        // for key presence rather than value.
        let result = envelope
            .get_mut("result")
            .map(serde_json::Value::take)
            .ok_or(RpcError::EmptyResponse)?;
        Ok(serde_json::from_value(result)?)
    }
}

impl RpcError {
    pub fn into_registry_error(self, method: &str) -> RegistryError {
        match self {
            Self::Http(e) => RegistryError::Http(e),
            other => RegistryError::Rpc {
                method: method.to_string(),
                reason: other.to_string(),
            },
        }
    }

    pub fn into_chain_error(self, method: &str) -> ChainError {
        match self {
            Self::Http(e) => ChainError::Http(e),
            other => ChainError::Rpc {
                method: method.to_string(),
                reason: other.to_string(),
            },
        }
    }
}
