//! Configuration for suiact.
//!
//! Settings are loaded with priority: env var > TOML config file > default.
//! The resolved [`Config`] is immutable and handed to the pipeline
//! explicitly; nothing reads the environment after startup.

mod contracts;
pub(crate) mod helpers;
mod llm;
mod network;
mod signer;

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::settings::Settings;

pub use self::contracts::{NftContractConfig, SwapConfig};
pub use self::llm::LlmConfig;
pub use self::network::NetworkConfig;
pub use self::signer::SignerConfig;

/// Resolved configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub network: NetworkConfig,
    pub nft: NftContractConfig,
    pub swap: SwapConfig,
    pub llm: LlmConfig,
    pub signer: SignerConfig,
}

impl Config {
    /// Load env files, the TOML overlay and the environment.
    ///
    /// If `toml_path` is `Some`, it is layered over the default
    /// `~/.suiact/config.toml` and must exist.
    pub fn load(toml_path: Option<&Path>) -> Result<Self, ConfigError> {
        crate::bootstrap::load_suiact_env();

        let mut settings = Settings::default();
        Self::apply_toml_overlay(&mut settings, &Settings::default_toml_path(), false)?;
        if let Some(path) = toml_path {
            Self::apply_toml_overlay(&mut settings, path, true)?;
        }

        Self::from_settings(&settings)
    }

    /// Resolve every section from `settings` plus the environment.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        Ok(Self {
            network: NetworkConfig::resolve(settings)?,
            nft: NftContractConfig::resolve(settings)?,
            swap: SwapConfig::resolve(settings)?,
            llm: LlmConfig::resolve(settings)?,
            signer: SignerConfig::resolve(settings)?,
        })
    }

    /// Merge a TOML file into settings. Missing or broken files are fatal
    /// only when `explicit`.
    fn apply_toml_overlay(
        settings: &mut Settings,
        path: &Path,
        explicit: bool,
    ) -> Result<(), ConfigError> {
        match Settings::load_toml(path) {
            Ok(Some(toml_settings)) => {
                settings.merge_from(&toml_settings);
                tracing::debug!("Loaded TOML config from {}", path.display());
            }
            Ok(None) => {
                if explicit {
                    return Err(ConfigError::ParseError(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
            }
            Err(e) => {
                if explicit {
                    return Err(ConfigError::ParseError(format!(
                        "Failed to load config file {}: {}",
                        path.display(),
                        e
                    )));
                }
                tracing::warn!("Failed to load default config file: {}", e);
            }
        }
        Ok(())
    }
}

/// Default config file location, for display.
pub fn default_config_path() -> PathBuf {
    Settings::default_toml_path()
}
