//! Token metadata and the registries that resolve symbols or coin types.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::chain::amount::MAX_DECIMALS;
use crate::chain::network::SuiNetwork;
use crate::chain::rpc::JsonRpcClient;
use crate::error::RegistryError;

/// Canonical metadata for one coin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenMetadata {
    /// Fully-qualified coin type with a 64-hex-digit package address.
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Token registry / resolution service.
///
/// `Ok(None)` means the reference is unknown on `network`; `Err` is reserved
/// for transport or data failures.
#[async_trait]
pub trait TokenRegistry: Send + Sync {
    async fn resolve(
        &self,
        reference: &str,
        network: SuiNetwork,
    ) -> Result<Option<TokenMetadata>, RegistryError>;
}

/// Whether `reference` looks like a coin type (`0x..::module::NAME`) rather
/// than a ticker symbol.
pub fn is_coin_type(reference: &str) -> bool {
    reference.contains("::")
}

/// Normalize a coin type so `0x2::sui::SUI` and its zero-padded long form
/// compare equal. Returns `None` when the address part is not hex.
pub fn normalize_coin_type(coin_type: &str) -> Option<String> {
    let mut parts = coin_type.trim().splitn(3, "::");
    let address = parts.next()?;
    let module = parts.next()?;
    let name = parts.next()?;
    if module.is_empty() || name.is_empty() {
        return None;
    }

    let hex = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address);
    if hex.is_empty() || hex.len() > 64 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    Some(format!(
        "0x{:0>64}::{}::{}",
        hex.to_ascii_lowercase(),
        module,
        name
    ))
}

#[derive(Debug, Clone)]
struct StaticEntry {
    networks: Vec<SuiNetwork>,
    metadata: TokenMetadata,
}

/// In-memory registry of well-known coins.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenRegistry {
    entries: Vec<StaticEntry>,
}

const ALL_NETWORKS: [SuiNetwork; 4] = [
    SuiNetwork::Mainnet,
    SuiNetwork::Testnet,
    SuiNetwork::Devnet,
    SuiNetwork::Localnet,
];

impl StaticTokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Native SUI on every network plus the major mainnet stables and DEX
    /// tokens.
    pub fn well_known() -> Self {
        Self::new()
            .with_token(&ALL_NETWORKS, "0x2::sui::SUI", "SUI", 9)
            .with_token(
                &[SuiNetwork::Mainnet],
                "0xdba34672e30cb065b1f93e3ab55318768fd6fef66c15942c9f7cb846e2f900e7::usdc::USDC",
                "USDC",
                6,
            )
            .with_token(
                &[SuiNetwork::Mainnet],
                "0xc060006111016b8a020ad5b33834984a437aaa7d3c74c18e09a95d48aceab08c::coin::COIN",
                "USDT",
                6,
            )
            .with_token(
                &[SuiNetwork::Mainnet],
                "0x06864a6f921804860930db6ddbe2e16acdf8504495ea7481637a1c8b9a8fe54b::cetus::CETUS",
                "CETUS",
                9,
            )
            .with_token(
                &[SuiNetwork::Mainnet],
                "0xdeeb7a4662eec9f2f3def03fb937a663dddaa2e215b8078a284d026b7946c270::deep::DEEP",
                "DEEP",
                6,
            )
    }

    /// Register a coin. Entries with an unparseable coin type or an
    /// out-of-range scale are skipped with a warning.
    pub fn with_token(
        mut self,
        networks: &[SuiNetwork],
        coin_type: &str,
        symbol: &str,
        decimals: u8,
    ) -> Self {
        let Some(address) = normalize_coin_type(coin_type) else {
            tracing::warn!(coin_type, "skipping static token with malformed coin type");
            return self;
        };
        if decimals > MAX_DECIMALS {
            tracing::warn!(coin_type, decimals, "skipping static token with unsupported scale");
            return self;
        }
        self.entries.push(StaticEntry {
            networks: networks.to_vec(),
            metadata: TokenMetadata {
                address,
                symbol: symbol.to_ascii_uppercase(),
                decimals,
            },
        });
        self
    }

    fn lookup(&self, reference: &str, network: SuiNetwork) -> Option<&TokenMetadata> {
        let mut candidates = self
            .entries
            .iter()
            .filter(|entry| entry.networks.contains(&network))
            .map(|entry| &entry.metadata);

        if is_coin_type(reference) {
            let wanted = normalize_coin_type(reference)?;
            candidates.find(|m| m.address == wanted)
        } else {
            let wanted = reference.trim();
            candidates.find(|m| m.symbol.eq_ignore_ascii_case(wanted))
        }
    }
}

#[async_trait]
impl TokenRegistry for StaticTokenRegistry {
    async fn resolve(
        &self,
        reference: &str,
        network: SuiNetwork,
    ) -> Result<Option<TokenMetadata>, RegistryError> {
        Ok(self.lookup(reference, network).cloned())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoinMetadataResponse {
    decimals: i64,
    symbol: String,
}

const GET_COIN_METADATA: &str = "suix_getCoinMetadata";

/// Registry backed by the fullnode's `suix_getCoinMetadata`. Only full coin
/// types can be looked up this way; symbols yield `None`.
#[derive(Debug, Clone)]
pub struct RpcTokenRegistry {
    client: JsonRpcClient,
    network: SuiNetwork,
}

impl RpcTokenRegistry {
    pub fn new(client: JsonRpcClient, network: SuiNetwork) -> Self {
        Self { client, network }
    }
}

#[async_trait]
impl TokenRegistry for RpcTokenRegistry {
    async fn resolve(
        &self,
        reference: &str,
        network: SuiNetwork,
    ) -> Result<Option<TokenMetadata>, RegistryError> {
        if network != self.network {
            tracing::debug!(%network, rpc_network = %self.network, "RPC registry bound to another network");
            return Ok(None);
        }
        if !is_coin_type(reference) {
            return Ok(None);
        }
        let Some(address) = normalize_coin_type(reference) else {
            return Ok(None);
        };

        let response: Option<CoinMetadataResponse> = self
            .client
            .call(GET_COIN_METADATA, serde_json::json!([address]))
            .await
            .map_err(|e| e.into_registry_error(GET_COIN_METADATA))?;

        let Some(metadata) = response else {
            return Ok(None);
        };

        let decimals = u8::try_from(metadata.decimals)
            .ok()
            .filter(|d| *d <= MAX_DECIMALS)
            .ok_or_else(|| RegistryError::MalformedMetadata {
                reference: reference.to_string(),
                reason: format!("unsupported decimals {}", metadata.decimals),
            })?;

        Ok(Some(TokenMetadata {
            address,
            symbol: metadata.symbol,
            decimals,
        }))
    }
}

/// Tries each registry in order and returns the first hit.
///
/// An error from one registry is logged and the next is tried; the error is
/// only returned when no later registry produced an answer.
#[derive(Clone, Default)]
pub struct ChainedRegistry {
    registries: Vec<Arc<dyn TokenRegistry>>,
}

impl ChainedRegistry {
    pub fn new(registries: Vec<Arc<dyn TokenRegistry>>) -> Self {
        Self { registries }
    }
}

#[async_trait]
impl TokenRegistry for ChainedRegistry {
    async fn resolve(
        &self,
        reference: &str,
        network: SuiNetwork,
    ) -> Result<Option<TokenMetadata>, RegistryError> {
        let mut last_error = None;
        for registry in &self.registries {
            match registry.resolve(reference, network).await {
                Ok(Some(metadata)) => return Ok(Some(metadata)),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(reference, "token registry lookup failed: {}", e);
                    last_error = Some(e);
                }
            }
        }
        match last_error {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }
}
