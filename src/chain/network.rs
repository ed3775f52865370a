//! Sui network identifiers and their public endpoints.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SuiNetwork {
    Mainnet,
    Testnet,
    Devnet,
    Localnet,
}

impl SuiNetwork {
    pub fn parse(value: &str, key: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "devnet" => Ok(Self::Devnet),
            "localnet" | "local" => Ok(Self::Localnet),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!(
                    "expected 'mainnet', 'testnet', 'devnet', or 'localnet', got '{value}'"
                ),
            }),
        }
    }

    /// Parse a comma-separated allow-list such as `mainnet,testnet`.
    pub fn parse_list(value: &str, key: &str) -> Result<Vec<Self>, ConfigError> {
        let mut networks = Vec::new();
        for item in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let network = Self::parse(item, key)?;
            if !networks.contains(&network) {
                networks.push(network);
            }
        }
        if networks.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: "must name at least one network".to_string(),
            });
        }
        Ok(networks)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Devnet => "devnet",
            Self::Localnet => "localnet",
        }
    }

    pub fn default_rpc_url(self) -> &'static str {
        match self {
            Self::Mainnet => "https://fullnode.mainnet.sui.io:443",
            Self::Testnet => "https://fullnode.testnet.sui.io:443",
            Self::Devnet => "https://fullnode.devnet.sui.io:443",
            Self::Localnet => "http://127.0.0.1:9000",
        }
    }

    pub fn default_explorer_url(self) -> &'static str {
        match self {
            Self::Mainnet => "https://suiscan.xyz/mainnet",
            Self::Testnet => "https://suiscan.xyz/testnet",
            Self::Devnet => "https://suiscan.xyz/devnet",
            Self::Localnet => "http://127.0.0.1:9001",
        }
    }
}

impl std::fmt::Display for SuiNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build an explorer link for a transaction digest.
pub fn transaction_link(explorer_base: &str, digest: &str) -> String {
    format!("{}/tx/{}", explorer_base.trim_end_matches('/'), digest)
}
