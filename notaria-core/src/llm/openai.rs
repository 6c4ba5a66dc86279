//! OpenAI-compatible provider client.
//!
//! One HTTP client covers both model-side capabilities the pipeline needs:
//! chat completions ([`AsyncLanguageModel`]) and embeddings
//! ([`AsyncEmbedder`]). Any server speaking the OpenAI wire format works,
//! whether the hosted API or a local vLLM/llama.cpp endpoint.
//!
//! Retry with backoff lives here, in the provider client, and nowhere else:
//! the pipeline itself never retries.

use async_trait::async_trait;

use crate::core::traits::{AsyncEmbedder, AsyncLanguageModel, GenerationParams, ModelInfo};
use crate::core::{RagError, Result};

/// OpenAI-compatible provider configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// Base URL of the API, e.g. `https://api.openai.com/v1`
    pub api_base: String,
    /// Bearer token; may be empty for local servers
    pub api_key: String,
    /// Model for chat/generation
    pub chat_model: String,
    /// Model for embeddings
    pub embedding_model: String,
    /// Dimensionality of the embedding model's vectors
    pub embedding_dimension: usize,
    /// Per-call timeout in seconds
    pub timeout_seconds: u64,
    /// Maximum retry attempts per call
    pub max_retries: u32,
    /// Default temperature for generation
    pub temperature: Option<f32>,
    /// Default maximum tokens to generate
    pub max_tokens: Option<u32>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            chat_model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_dimension: 1536,
            timeout_seconds: 30,
            max_retries: 3,
            temperature: Some(0.2),
            max_tokens: Some(1000),
        }
    }
}

/// Client for OpenAI-compatible chat and embeddings endpoints
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    config: OpenAiConfig,
    agent: ureq::Agent,
}

impl OpenAiClient {
    /// Create a new client with a per-call timeout taken from the config.
    pub fn new(config: OpenAiConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build();
        Self { config, agent }
    }

    /// Access the configuration this client was built with.
    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    /// POST a JSON body with bounded retry and exponential backoff.
    ///
    /// `wrap` turns the final failure message into the caller's error
    /// variant, so chat failures surface as `LanguageModel` and embedding
    /// failures as `Embedding`.
    async fn post_with_retry(
        &self,
        endpoint: &str,
        body: &serde_json::Value,
        wrap: fn(String) -> RagError,
    ) -> Result<serde_json::Value> {
        let mut last_error = None;
        for attempt in 1..=self.config.max_retries {
            let mut request = self
                .agent
                .post(endpoint)
                .set("Content-Type", "application/json");
            if !self.config.api_key.is_empty() {
                request = request.set("Authorization", &format!("Bearer {}", self.config.api_key));
            }

            match request.send_json(body) {
                Ok(response) => {
                    return response
                        .into_json()
                        .map_err(|e| wrap(format!("failed to parse response JSON: {e}")));
                },
                Err(e) => {
                    tracing::warn!(
                        "request to {} failed (attempt {}/{}): {}",
                        endpoint,
                        attempt,
                        self.config.max_retries,
                        e
                    );
                    last_error = Some(e);

                    if attempt < self.config.max_retries {
                        tokio::time::sleep(std::time::Duration::from_millis(100 * attempt as u64))
                            .await;
                    }
                },
            }
        }

        Err(wrap(format!(
            "request failed after {} attempts: {:?}",
            self.config.max_retries, last_error
        )))
    }

    async fn chat(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let endpoint = format!("{}/chat/completions", self.config.api_base);

        let mut body = serde_json::json!({
            "model": self.config.chat_model,
            "messages": [{"role": "user", "content": prompt}],
        });
        if let Some(temperature) = params.temperature.or(self.config.temperature) {
            body["temperature"] = serde_json::json!(temperature);
        }
        if let Some(max_tokens) = params
            .max_tokens
            .or(self.config.max_tokens.map(|t| t as usize))
        {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        if let Some(top_p) = params.top_p {
            body["top_p"] = serde_json::json!(top_p);
        }

        let response = self
            .post_with_retry(&endpoint, &body, |message| RagError::LanguageModel {
                message,
            })
            .await?;

        response["choices"][0]["message"]["content"]
            .as_str()
            .map(|content| content.to_string())
            .ok_or_else(|| RagError::LanguageModel {
                message: format!("unexpected chat completion shape: {response}"),
            })
    }
}

#[async_trait]
impl AsyncLanguageModel for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.chat(prompt, &GenerationParams::default()).await
    }

    async fn complete_with_params(&self, prompt: &str, params: GenerationParams) -> Result<String> {
        self.chat(prompt, &params).await
    }

    async fn is_available(&self) -> bool {
        let endpoint = format!("{}/models", self.config.api_base);
        let mut request = self.agent.get(&endpoint);
        if !self.config.api_key.is_empty() {
            request = request.set("Authorization", &format!("Bearer {}", self.config.api_key));
        }
        request.call().is_ok()
    }

    async fn model_info(&self) -> ModelInfo {
        ModelInfo {
            name: self.config.chat_model.clone(),
            version: None,
            max_context_length: None,
        }
    }
}

#[async_trait]
impl AsyncEmbedder for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Option<Vec<f32>>> {
        let endpoint = format!("{}/embeddings", self.config.api_base);
        let body = serde_json::json!({
            "model": self.config.embedding_model,
            "input": text,
        });

        let response = self
            .post_with_retry(&endpoint, &body, |message| RagError::Embedding { message })
            .await?;

        let data = response["data"]
            .as_array()
            .ok_or_else(|| RagError::Embedding {
                message: format!("unexpected embeddings response shape: {response}"),
            })?;

        // An empty data array is the provider's defined "no vector" outcome.
        let Some(first) = data.first() else {
            return Ok(None);
        };

        let vector = first["embedding"]
            .as_array()
            .ok_or_else(|| RagError::Embedding {
                message: "embeddings entry is missing its vector".to_string(),
            })?
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();

        Ok(Some(vector))
    }

    fn dimension(&self) -> usize {
        self.config.embedding_dimension
    }
}
