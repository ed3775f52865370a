use secrecy::SecretString;

use crate::config::helpers::{optional_env, parse_env_or};
use crate::error::ConfigError;
use crate::settings::Settings;

/// Remote signing service and gas settings.
#[derive(Debug, Clone)]
pub struct SignerConfig {
    pub endpoint: Option<String>,
    pub token: Option<SecretString>,
    pub sender_address: Option<String>,
    /// Gas budget in MIST.
    pub gas_budget: u64,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            token: None,
            sender_address: None,
            gas_budget: 50_000_000,
        }
    }
}

impl SignerConfig {
    pub(crate) fn resolve(settings: &Settings) -> Result<Self, ConfigError> {
        let gas_budget = parse_env_or(
            "SUI_GAS_BUDGET",
            settings.signer.gas_budget,
            "an integer amount of MIST",
        )?;
        if gas_budget == 0 {
            return Err(ConfigError::InvalidValue {
                key: "SUI_GAS_BUDGET".to_string(),
                message: "must be > 0".to_string(),
            });
        }

        Ok(Self {
            endpoint: optional_env("SUI_SIGNER_URL")?.or_else(|| settings.signer.endpoint.clone()),
            token: optional_env("SUI_SIGNER_TOKEN")?.map(SecretString::from),
            sender_address: optional_env("SUI_SENDER_ADDRESS")?
                .or_else(|| settings.signer.sender_address.clone()),
            gas_budget,
        })
    }
}
