use std::time::Duration;

use crate::chain::network::SuiNetwork;
use crate::config::helpers::{optional_env, parse_env_or};
use crate::error::ConfigError;
use crate::settings::Settings;

/// Resolved network selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub network: SuiNetwork,
    pub rpc_url: String,
    pub explorer_url: String,
    pub request_timeout_ms: u64,
}

impl NetworkConfig {
    /// Public endpoints of `network` with the default timeout.
    pub fn for_network(network: SuiNetwork) -> Self {
        Self {
            network,
            rpc_url: network.default_rpc_url().to_string(),
            explorer_url: network.default_explorer_url().to_string(),
            request_timeout_ms: 30_000,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub(crate) fn resolve(settings: &Settings) -> Result<Self, ConfigError> {
        let network = SuiNetwork::parse(
            &optional_env("SUI_NETWORK")?.unwrap_or_else(|| settings.network.network.clone()),
            "SUI_NETWORK",
        )?;

        let rpc_url = optional_env("SUI_RPC_URL")?
            .or_else(|| settings.network.rpc_url.clone())
            .unwrap_or_else(|| network.default_rpc_url().to_string());
        check_http_url(&rpc_url, "SUI_RPC_URL")?;

        let explorer_url = optional_env("SUI_EXPLORER_URL")?
            .or_else(|| settings.network.explorer_url.clone())
            .unwrap_or_else(|| network.default_explorer_url().to_string());
        check_http_url(&explorer_url, "SUI_EXPLORER_URL")?;

        let request_timeout_ms = parse_env_or(
            "SUI_REQUEST_TIMEOUT_MS",
            settings.network.request_timeout_ms,
            "a positive integer",
        )?;
        if request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "SUI_REQUEST_TIMEOUT_MS".to_string(),
                message: "must be > 0".to_string(),
            });
        }

        Ok(Self {
            network,
            rpc_url,
            explorer_url: explorer_url.trim_end_matches('/').to_string(),
            request_timeout_ms,
        })
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::for_network(SuiNetwork::Testnet)
    }
}

pub(crate) fn check_http_url(value: &str, key: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(value).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("'{value}' is not a URL: {e}"),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("unsupported scheme '{other}', expected http or https"),
        }),
    }
}
