use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::ModelConfig;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Failures surfaced by a completion provider. The render core never sees
/// these; the gateway maps them onto an error response.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("no API key for provider '{provider}'; set {env_var}")]
    MissingApiKey {
        provider: String,
        env_var: &'static str,
    },

    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("request to {provider} failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned {status}: {body}")]
    Status {
        provider: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("{provider} response contained no completion text")]
    EmptyCompletion { provider: &'static str },
}

/// Trait for chat-completion providers. One prompt in, the full completion
/// text out — no streaming, the caller renders the whole response at once.
#[async_trait]
pub trait CompletionProvider: Send + Sync + std::fmt::Debug {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;

    fn model(&self) -> &str;
}

#[derive(Debug)]
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    system_prompt: Option<String>,
}

impl AnthropicProvider {
    pub fn new(
        api_key: String,
        model: String,
        max_tokens: u32,
        system_prompt: Option<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            max_tokens,
            system_prompt,
        }
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let mut body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [{ "role": "user", "content": prompt }],
        });

        if let Some(system) = self.system_prompt.as_deref() {
            body["system"] = serde_json::json!(system);
        }

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: "anthropic",
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                provider: "anthropic",
                status,
                body,
            });
        }

        let payload: serde_json::Value =
            response
                .json()
                .await
                .map_err(|source| ProviderError::Transport {
                    provider: "anthropic",
                    source,
                })?;
        debug!(model = %self.model, "anthropic completion received");

        extract_anthropic_text(&payload).ok_or(ProviderError::EmptyCompletion {
            provider: "anthropic",
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug)]
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    system_prompt: Option<String>,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(
        api_key: String,
        model: String,
        max_tokens: u32,
        system_prompt: Option<String>,
        base_url: Option<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            max_tokens,
            system_prompt,
            base_url: base_url.unwrap_or_else(|| OPENAI_API_BASE.to_string()),
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        // Prepend system message if provided
        let mut messages = Vec::new();
        if let Some(system) = self.system_prompt.as_deref() {
            messages.push(serde_json::json!({
                "role": "system",
                "content": system,
            }));
        }
        messages.push(serde_json::json!({
            "role": "user",
            "content": prompt,
        }));

        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": self.max_tokens,
        });

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: "openai",
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                provider: "openai",
                status,
                body,
            });
        }

        let payload: serde_json::Value =
            response
                .json()
                .await
                .map_err(|source| ProviderError::Transport {
                    provider: "openai",
                    source,
                })?;
        debug!(model = %self.model, "openai completion received");

        extract_openai_text(&payload).ok_or(ProviderError::EmptyCompletion { provider: "openai" })
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Pull the completion text out of an Anthropic messages response.
fn extract_anthropic_text(payload: &serde_json::Value) -> Option<String> {
    let text = payload
        .get("content")?
        .as_array()?
        .iter()
        .filter(|block| block.get("type").and_then(|t| t.as_str()) == Some("text"))
        .filter_map(|block| block.get("text").and_then(|t| t.as_str()))
        .collect::<String>();
    if text.is_empty() { None } else { Some(text) }
}

/// Pull the completion text out of an OpenAI chat-completions response.
fn extract_openai_text(payload: &serde_json::Value) -> Option<String> {
    let text = payload
        .get("choices")?
        .as_array()?
        .first()?
        .get("message")?
        .get("content")?
        .as_str()?;
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Create a provider from config.
pub fn from_config(config: &ModelConfig) -> Result<Box<dyn CompletionProvider>, ProviderError> {
    let env_var = match config.provider.as_str() {
        "anthropic" => "ANTHROPIC_API_KEY",
        "openai" => "OPENAI_API_KEY",
        other => return Err(ProviderError::UnknownProvider(other.to_string())),
    };

    let api_key = config
        .api_key
        .clone()
        .ok_or_else(|| ProviderError::MissingApiKey {
            provider: config.provider.clone(),
            env_var,
        })?;

    match config.provider.as_str() {
        "anthropic" => Ok(Box::new(AnthropicProvider::new(
            api_key,
            config.model.clone(),
            config.max_tokens,
            config.system_prompt.clone(),
        ))),
        "openai" => Ok(Box::new(OpenAiProvider::new(
            api_key,
            config.model.clone(),
            config.max_tokens,
            config.system_prompt.clone(),
            config.base_url.clone(),
        ))),
        other => Err(ProviderError::UnknownProvider(other.to_string())),
    }
}
