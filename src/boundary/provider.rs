//! Language-model boundary.
//!
//! The model is an opaque text-completion service reached over a local
//! network endpoint. Retry policy lives with the caller, not here; every
//! transport failure surfaces as `BoundaryUnavailable`.

use anyhow::Context;
use async_trait::async_trait;
use ollama_rs::generation::chat::{request::ChatMessageRequest, ChatMessage};
use ollama_rs::models::ModelOptions;
use ollama_rs::Ollama;
use reqwest::Client;
use serde_json::json;

use crate::config::{BoundaryConfig, ProviderKind};
use crate::error::{DreamError, Result};

/// Per-call options for a completion request.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub model: String,
    /// Creativity parameter, forwarded as sampling temperature.
    pub temperature: f64,
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// One synchronous request/response completion call.
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String>;

    /// Endpoint label used in error reports.
    fn endpoint(&self) -> &str;
}

/// Build the configured provider.
pub fn build_provider(config: &BoundaryConfig) -> Result<std::sync::Arc<dyn LanguageModel>> {
    match config.provider {
        ProviderKind::Ollama => Ok(std::sync::Arc::new(OllamaProvider::new(&config.url)?)),
        ProviderKind::OpenAiCompatible => {
            Ok(std::sync::Arc::new(OpenAiCompatibleProvider::new(&config.url)))
        }
    }
}

pub struct OllamaProvider {
    client: Ollama,
    endpoint: String,
}

impl OllamaProvider {
    pub fn new(url: &str) -> Result<Self> {
        let (host, port) = split_host_port(url)?;
        Ok(Self {
            client: Ollama::new(host, port),
            endpoint: url.to_string(),
        })
    }
}

/// Split "http://host:port" into the pieces the ollama client wants.
fn split_host_port(url: &str) -> Result<(String, u16)> {
    let trimmed = url.trim_end_matches('/');
    let (scheme, rest) = trimmed
        .split_once("://")
        .ok_or_else(|| DreamError::config(format!("boundary url missing scheme: {}", url)))?;
    match rest.rsplit_once(':') {
        Some((host, port)) => {
            let port: u16 = port
                .parse()
                .map_err(|_| DreamError::config(format!("invalid port in boundary url: {}", url)))?;
            Ok((format!("{}://{}", scheme, host), port))
        }
        None => Ok((trimmed.to_string(), 11434)),
    }
}

#[async_trait]
impl LanguageModel for OllamaProvider {
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String> {
        let request = ChatMessageRequest::new(
            options.model.clone(),
            vec![ChatMessage::user(prompt.to_string())],
        )
        .options(ModelOptions::default().temperature(options.temperature as f32));

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| DreamError::boundary(&self.endpoint, e))?;

        Ok(response.message.content)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

pub struct OpenAiCompatibleProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAiCompatibleProvider {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: std::env::var("OPENAI_API_KEY").ok(),
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAiCompatibleProvider {
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String> {
        let body = json!({
            "model": options.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": options.temperature,
            "stream": false,
        });

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| DreamError::boundary(&self.base_url, e))?;

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| DreamError::boundary(&self.base_url, e))?;

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .context("missing content in completion response")
            .map_err(|e| DreamError::GenerationFailure(e.to_string()))?;

        Ok(content.to_string())
    }

    fn endpoint(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_host_port() {
        assert_eq!(
            split_host_port("http://localhost:11434").unwrap(),
            ("http://localhost".to_string(), 11434)
        );
        assert_eq!(
            split_host_port("http://127.0.0.1:8080/").unwrap(),
            ("http://127.0.0.1".to_string(), 8080)
        );
        assert_eq!(
            split_host_port("http://localhost").unwrap(),
            ("http://localhost".to_string(), 11434)
        );
        assert!(split_host_port("localhost:11434").is_err());
        assert!(split_host_port("http://localhost:notaport").is_err());
    }
}
