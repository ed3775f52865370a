//! Signing identity. Key material never enters this crate.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::SignerConfig;
use crate::error::{ChainError, ConfigError};

/// Opaque signing identity supplied by the caller.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Sender address transactions are built for.
    fn address(&self) -> &str;

    /// Sign BCS transaction bytes, returning the serialized Sui signature
    /// (flag || signature || public key) in base64.
    async fn sign(&self, tx_bytes: &[u8]) -> Result<String, ChainError>;
}

#[derive(Serialize)]
struct SignRequest<'a> {
    address: &'a str,
    tx_bytes: String,
}

#[derive(Deserialize)]
struct SignResponse {
    signature: String,
}

/// Signer that delegates to an external signing service (wallet daemon, KMS
/// bridge) over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteSigner {
    http: Client,
    endpoint: String,
    token: Option<SecretString>,
    address: String,
}

impl RemoteSigner {
    pub fn new(
        endpoint: impl Into<String>,
        address: impl Into<String>,
        token: Option<SecretString>,
    ) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
            token,
            address: address.into(),
        }
    }

    /// Signing identity provider: build the signer described by config.
    pub fn from_config(config: &SignerConfig) -> Result<Self, ConfigError> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| ConfigError::MissingRequired {
                key: "SUI_SIGNER_URL".to_string(),
                hint: "Point it at a signing service that accepts base64 transaction bytes."
                    .to_string(),
            })?;
        let address = config
            .sender_address
            .clone()
            .ok_or_else(|| ConfigError::MissingRequired {
                key: "SUI_SENDER_ADDRESS".to_string(),
                hint: "Set the address the signing service signs for.".to_string(),
            })?;
        Ok(Self::new(endpoint, address, config.token.clone()))
    }
}

#[async_trait]
impl Signer for RemoteSigner {
    fn address(&self) -> &str {
        &self.address
    }

    async fn sign(&self, tx_bytes: &[u8]) -> Result<String, ChainError> {
        let body = SignRequest {
            address: &self.address,
            tx_bytes: STANDARD.encode(tx_bytes),
        };
        let mut request = self.http.post(&self.endpoint).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ChainError::Signer(format!("status {}: {}", status, text)));
        }

        let signed: SignResponse = response.json().await?;
        if signed.signature.trim().is_empty() {
            return Err(ChainError::Signer("empty signature".to_string()));
        }
        Ok(signed.signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_requires_endpoint_and_address() {
        let err = RemoteSigner::from_config(&SignerConfig::default()).unwrap_err();
        match err {
            ConfigError::MissingRequired { key, .. } => assert_eq!(key, "SUI_SIGNER_URL"),
            other => panic!("unexpected error: {other}"),
        }

        let config = SignerConfig {
            endpoint: Some("http://127.0.0.1:7777/sign".to_string()),
            ..SignerConfig::default()
        };
        let err = RemoteSigner::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("SUI_SENDER_ADDRESS"));
    }

    #[test]
    fn from_config_keeps_sender_address() {
        let config = SignerConfig {
            endpoint: Some("http://127.0.0.1:7777/sign".to_string()),
            sender_address: Some("0x42".to_string()),
            ..SignerConfig::default()
        };
        let signer = RemoteSigner::from_config(&config).unwrap();
        assert_eq!(signer.address(), "0x42");
    }
}
