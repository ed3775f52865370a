use std::time::Duration;

use secrecy::SecretString;

use crate::config::helpers::{optional_env, parse_env_or};
use crate::config::network::check_http_url;
use crate::error::ConfigError;
use crate::settings::Settings;

/// Completion service configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: Option<SecretString>,
    pub model: String,
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let settings = crate::settings::LlmSettings::default();
        Self {
            api_url: settings.api_url,
            api_key: None,
            model: settings.model,
            timeout_ms: settings.timeout_ms,
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub(crate) fn resolve(settings: &Settings) -> Result<Self, ConfigError> {
        let api_url = optional_env("LLM_API_URL")?.unwrap_or_else(|| settings.llm.api_url.clone());
        check_http_url(&api_url, "LLM_API_URL")?;

        let model = optional_env("LLM_MODEL")?.unwrap_or_else(|| settings.llm.model.clone());

        let timeout_ms = parse_env_or("LLM_TIMEOUT_MS", settings.llm.timeout_ms, "a positive integer")?;
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "LLM_TIMEOUT_MS".to_string(),
                message: "must be > 0".to_string(),
            });
        }

        Ok(Self {
            api_url,
            api_key: optional_env("LLM_API_KEY")?.map(SecretString::from),
            model,
            timeout_ms,
        })
    }
}
