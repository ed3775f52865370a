//! HTTP completion client.
//!
//! Speaks both the Anthropic messages API and OpenAI-compatible chat
//! completions; the format is picked from the endpoint URL.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::{ConfigError, LlmError};
use crate::llm::json::extract_json_object;
use crate::llm::provider::{CompletionProvider, ExtractionRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFormat {
    Anthropic,
    OpenAi,
}

impl ApiFormat {
    pub fn detect(url: &str) -> Self {
        if url.contains("anthropic.com") {
            Self::Anthropic
        } else {
            Self::OpenAi
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
        }
    }
}

const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Clone)]
pub struct HttpCompletionClient {
    client: Client,
    api_key: SecretString,
    api_url: String,
    model: String,
    format: ApiFormat,
}

impl HttpCompletionClient {
    pub fn new(api_key: SecretString, api_url: impl Into<String>, model: impl Into<String>) -> Self {
        let api_url = api_url.into();
        Self {
            client: Client::new(),
            format: ApiFormat::detect(&api_url),
            api_key,
            api_url,
            model: model.into(),
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, ConfigError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| ConfigError::MissingRequired {
                key: "LLM_API_KEY".to_string(),
                hint: "Set it to an API key for the completion endpoint in LLM_API_URL."
                    .to_string(),
            })?;
        Ok(Self::new(api_key, config.api_url.clone(), config.model.clone()))
    }

    pub fn format(&self) -> ApiFormat {
        self.format
    }

    /// Send one system + user exchange and return the reply text.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        tracing::debug!(provider = self.format.as_str(), model = %self.model, "sending completion");
        match self.format {
            ApiFormat::Anthropic => self.complete_anthropic(system, user).await,
            ApiFormat::OpenAi => self.complete_openai(system, user).await,
        }
    }

    async fn complete_anthropic(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let request = AnthropicRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: 0.0,
            system,
            messages: vec![Message {
                role: "user",
                content: user,
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await?;
        let response = self.check_status(response).await?;

        let completion: AnthropicResponse = response.json().await?;
        completion
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| self.invalid("empty response"))
    }

    async fn complete_openai(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let request = OpenAiRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: 0.0,
            messages: vec![
                Message {
                    role: "system",
                    content: system,
                },
                Message {
                    role: "user",
                    content: user,
                },
            ],
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;
        let response = self.check_status(response).await?;

        let completion: OpenAiResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .find_map(|c| c.message.content)
            .ok_or_else(|| self.invalid("empty response"))
    }

    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(LlmError::RequestFailed {
            provider: self.format.as_str().to_string(),
            reason: format!("status {status}: {body}"),
        })
    }

    fn invalid(&self, reason: impl Into<String>) -> LlmError {
        LlmError::InvalidResponse {
            provider: self.format.as_str().to_string(),
            reason: reason.into(),
        }
    }
}

fn system_prompt(schema: &serde_json::Value) -> String {
    format!(
        "You extract parameters for blockchain actions from conversations.\n\
         Reply with exactly one JSON object that conforms to this JSON Schema and nothing else:\n\
         {schema}\n\
         Use null for a nullable value the user did not state. Never invent values."
    )
}

#[async_trait]
impl CompletionProvider for HttpCompletionClient {
    fn name(&self) -> &str {
        self.format.as_str()
    }

    async fn extract(&self, request: &ExtractionRequest) -> Result<serde_json::Value, LlmError> {
        let reply = self
            .complete(&system_prompt(&request.schema), &request.prompt)
            .await?;
        let object = extract_json_object(&reply)
            .ok_or_else(|| self.invalid("reply contained no JSON object"))?;
        Ok(serde_json::from_str(object)?)
    }
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
