use std::str::FromStr;

use rust_decimal::Decimal;

use crate::chain::network::SuiNetwork;
use crate::config::helpers::{optional_env, parse_bool_env};
use crate::error::ConfigError;
use crate::settings::Settings;

/// Location of the NFT contract used by the mint action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NftContractConfig {
    pub package_id: Option<String>,
    pub module: Option<String>,
}

impl NftContractConfig {
    /// Both the package and the module are known.
    pub fn is_configured(&self) -> bool {
        self.package_id.is_some() && self.module.is_some()
    }

    pub(crate) fn resolve(settings: &Settings) -> Result<Self, ConfigError> {
        Ok(Self {
            package_id: optional_env("NFT_PACKAGE_ID")?.or_else(|| settings.nft.package_id.clone()),
            module: optional_env("NFT_MODULE")?.or_else(|| settings.nft.module.clone()),
        })
    }
}

/// Swap router location and policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapConfig {
    pub allowed_networks: Vec<SuiNetwork>,
    pub package_id: Option<String>,
    pub module: String,
    pub function: String,
    pub default_slippage: Decimal,
    pub default_min_amount_out: Decimal,
    pub require_min_amount_out: bool,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            allowed_networks: vec![SuiNetwork::Mainnet],
            package_id: None,
            module: "router".to_string(),
            function: "swap_exact_in".to_string(),
            default_slippage: Decimal::new(1, 2),
            default_min_amount_out: Decimal::ZERO,
            require_min_amount_out: false,
        }
    }
}

fn parse_decimal(raw: &str, key: &str) -> Result<Decimal, ConfigError> {
    Decimal::from_str(raw.trim()).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("'{raw}' is not a decimal number: {e}"),
    })
}

impl SwapConfig {
    pub fn allows(&self, network: SuiNetwork) -> bool {
        self.allowed_networks.contains(&network)
    }

    pub(crate) fn resolve(settings: &Settings) -> Result<Self, ConfigError> {
        let allowed_raw = optional_env("SWAP_ALLOWED_NETWORKS")?
            .unwrap_or_else(|| settings.swap.allowed_networks.join(","));
        let allowed_networks = SuiNetwork::parse_list(&allowed_raw, "SWAP_ALLOWED_NETWORKS")?;

        let package_id =
            optional_env("SWAP_PACKAGE_ID")?.or_else(|| settings.swap.package_id.clone());
        let module = optional_env("SWAP_MODULE")?.unwrap_or_else(|| settings.swap.module.clone());
        let function =
            optional_env("SWAP_FUNCTION")?.unwrap_or_else(|| settings.swap.function.clone());

        let default_slippage = parse_decimal(
            &optional_env("SWAP_DEFAULT_SLIPPAGE")?
                .unwrap_or_else(|| settings.swap.default_slippage.clone()),
            "SWAP_DEFAULT_SLIPPAGE",
        )?;
        if default_slippage < Decimal::ZERO || default_slippage > Decimal::ONE {
            return Err(ConfigError::InvalidValue {
                key: "SWAP_DEFAULT_SLIPPAGE".to_string(),
                message: format!("{default_slippage} must be between 0 and 1"),
            });
        }

        let default_min_amount_out = parse_decimal(
            &optional_env("SWAP_DEFAULT_MIN_AMOUNT_OUT")?
                .unwrap_or_else(|| settings.swap.default_min_amount_out.clone()),
            "SWAP_DEFAULT_MIN_AMOUNT_OUT",
        )?;
        if default_min_amount_out < Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                key: "SWAP_DEFAULT_MIN_AMOUNT_OUT".to_string(),
                message: "must not be negative".to_string(),
            });
        }

        let require_min_amount_out = parse_bool_env(
            "SWAP_REQUIRE_MIN_AMOUNT_OUT",
            settings.swap.require_min_amount_out,
        )?;

        Ok(Self {
            allowed_networks,
            package_id,
            module,
            function,
            default_slippage,
            default_min_amount_out,
            require_min_amount_out,
        })
    }
}
