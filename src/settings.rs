//! Raw user settings.
//!
//! Stored in ~/.suiact/config.toml. Values here sit below environment
//! variables and above built-in defaults; [`crate::config`] resolves them
//! into typed values. Secrets are never read from this file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// User settings persisted to disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub network: NetworkSettings,

    #[serde(default)]
    pub nft: NftSettings,

    #[serde(default)]
    pub swap: SwapSettings,

    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub signer: SignerSettings,
}

/// Sui network selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkSettings {
    /// "mainnet", "testnet", "devnet" or "localnet".
    #[serde(default = "default_network")]
    pub network: String,

    /// Fullnode JSON-RPC URL override.
    #[serde(default)]
    pub rpc_url: Option<String>,

    /// Explorer base URL override used for transaction links.
    #[serde(default)]
    pub explorer_url: Option<String>,

    /// Per-request timeout for chain calls in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_network() -> String {
    "testnet".to_string()
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            network: default_network(),
            rpc_url: None,
            explorer_url: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// NFT contract location. The mint action is unavailable until both are set.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct NftSettings {
    #[serde(default)]
    pub package_id: Option<String>,

    #[serde(default)]
    pub module: Option<String>,
}

/// Swap router and policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SwapSettings {
    /// Networks swaps may run on.
    #[serde(default = "default_allowed_networks")]
    pub allowed_networks: Vec<String>,

    #[serde(default)]
    pub package_id: Option<String>,

    #[serde(default = "default_swap_module")]
    pub module: String,

    #[serde(default = "default_swap_function")]
    pub function: String,

    /// Slippage fraction used when the request names none.
    #[serde(default = "default_slippage")]
    pub default_slippage: String,

    /// Minimum output used when the request names none.
    #[serde(default = "default_min_amount_out")]
    pub default_min_amount_out: String,

    /// Fail instead of defaulting when no minimum output is stated.
    #[serde(default)]
    pub require_min_amount_out: bool,
}

fn default_allowed_networks() -> Vec<String> {
    vec!["mainnet".to_string()]
}

fn default_swap_module() -> String {
    "router".to_string()
}

fn default_swap_function() -> String {
    "swap_exact_in".to_string()
}

fn default_slippage() -> String {
    "0.01".to_string()
}

fn default_min_amount_out() -> String {
    "0".to_string()
}

impl Default for SwapSettings {
    fn default() -> Self {
        Self {
            allowed_networks: default_allowed_networks(),
            package_id: None,
            module: default_swap_module(),
            function: default_swap_function(),
            default_slippage: default_slippage(),
            default_min_amount_out: default_min_amount_out(),
            require_min_amount_out: false,
        }
    }
}

/// Completion service endpoint. The API key comes from `LLM_API_KEY` only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmSettings {
    #[serde(default = "default_llm_api_url")]
    pub api_url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_llm_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_llm_api_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_timeout_ms() -> u64 {
    60_000
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_url: default_llm_api_url(),
            model: default_llm_model(),
            timeout_ms: default_llm_timeout_ms(),
        }
    }
}

/// Remote signing service. The bearer token comes from `SUI_SIGNER_TOKEN` only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignerSettings {
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub sender_address: Option<String>,

    /// Gas budget in MIST.
    #[serde(default = "default_gas_budget")]
    pub gas_budget: u64,
}

fn default_gas_budget() -> u64 {
    50_000_000
}

impl Default for SignerSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            sender_address: None,
            gas_budget: default_gas_budget(),
        }
    }
}

impl Settings {
    /// Default TOML config file path (~/.suiact/config.toml).
    pub fn default_toml_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".suiact")
            .join("config.toml")
    }

    /// Load settings from a TOML file.
    ///
    /// Returns `None` if the file doesn't exist. Returns an error only
    /// if the file exists but can't be parsed.
    pub fn load_toml(path: &std::path::Path) -> Result<Option<Self>, String> {
        let data = match std::fs::read_to_string(path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(format!("failed to read {}: {}", path.display(), e)),
        };

        let settings: Self = toml::from_str(&data)
            .map_err(|e| format!("invalid TOML in {}: {}", path.display(), e))?;
        Ok(Some(settings))
    }

    /// Merge values from `other` into `self`, preferring `other` for
    /// fields that differ from the default.
    ///
    /// Used to layer an explicit `--config` file over the default one:
    /// only the fields the overlay actually changed are applied.
    pub fn merge_from(&mut self, other: &Self) {
        let default_json = match serde_json::to_value(Self::default()) {
            Ok(v) => v,
            Err(_) => return,
        };
        let other_json = match serde_json::to_value(other) {
            Ok(v) => v,
            Err(_) => return,
        };
        let mut self_json = match serde_json::to_value(&*self) {
            Ok(v) => v,
            Err(_) => return,
        };

        merge_non_default(&mut self_json, &other_json, &default_json);

        if let Ok(merged) = serde_json::from_value(self_json) {
            *self = merged;
        }
    }
}

/// Recursively merge `other` into `target` for the fields where `other`
/// differs from `defaults`.
fn merge_non_default(
    target: &mut serde_json::Value,
    other: &serde_json::Value,
    defaults: &serde_json::Value,
) {
    match (target, other, defaults) {
        (
            serde_json::Value::Object(t),
            serde_json::Value::Object(o),
            serde_json::Value::Object(d),
        ) => {
            for (key, other_val) in o {
                let default_val = d.get(key).cloned().unwrap_or(serde_json::Value::Null);
                if let Some(target_val) = t.get_mut(key) {
                    merge_non_default(target_val, other_val, &default_val);
                } else if other_val != &default_val {
                    t.insert(key.clone(), other_val.clone());
                }
            }
        }
        (target, other, defaults) => {
            if other != defaults {
                *target = other.clone();
            }
        }
    }
}
