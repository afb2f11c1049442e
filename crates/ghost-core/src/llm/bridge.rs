//! OpenAI-compatible bridge: structured chat completions and embeddings.
//!
//! Works against any endpoint that speaks the `/chat/completions` +
//! `/embeddings` dialect (OpenAI, OpenRouter, local gateways). Structured output is
//! requested with `response_format = json_schema` in strict mode; conformance is still
//! re-checked locally by the schema gate.
//!
//! API key: `GHOST_API_KEY` or `OPENAI_API_KEY`. Default models: `gpt-4o-mini` and
//! `text-embedding-3-small`.

use super::{EmbeddingModel, GenerationRequest, GenerativeModel};
use crate::config::GhostConfig;
use crate::error::{GhostError, GhostResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub(crate) const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub(crate) const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub(crate) const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    strict: bool,
    schema: &'a serde_json::Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

/// HTTP adapter for generation and embedding.
pub struct OpenAiBridge {
    api_base: String,
    api_key: String,
    chat_model: String,
    embedding_model: String,
    client: reqwest::Client,
}

impl OpenAiBridge {
    /// Bridge with default endpoint and models.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_timeout(api_key, Duration::from_secs(60))
    }

    fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: api_key.into().trim().to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            client,
        }
    }

    /// Bridge configured from [`GhostConfig`]. Fails when no API key is available.
    pub fn from_config(config: &GhostConfig) -> GhostResult<Self> {
        let key = config.resolved_api_key().ok_or_else(|| {
            GhostError::Config("no API key configured (GHOST_API_KEY / OPENAI_API_KEY)".into())
        })?;
        Ok(Self::with_timeout(key, config.request_timeout())
            .with_api_base(&config.api_base)
            .with_model(&config.chat_model)
            .with_embedding_model(&config.embedding_model))
    }

    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.chat_model = model.to_string();
        self
    }

    pub fn with_embedding_model(mut self, model: &str) -> Self {
        self.embedding_model = model.to_string();
        self
    }

    async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        service: &'static str,
        path: &str,
        body: &B,
    ) -> GhostResult<R> {
        let url = format!("{}/{}", self.api_base, path);
        let res = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| GhostError::service(service, format!("request failed: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            tracing::error!(
                target: "ghost::llm",
                service,
                status = %status,
                "HTTP {} from {}",
                status,
                path
            );
            return Err(GhostError::service(
                service,
                format!("API error {}: {}", status, text),
            ));
        }

        res.json::<R>()
            .await
            .map_err(|e| GhostError::service(service, format!("response parse failed: {}", e)))
    }
}

#[async_trait]
impl GenerativeModel for OpenAiBridge {
    async fn generate(&self, request: &GenerationRequest) -> GhostResult<String> {
        let body = ChatRequest {
            model: &self.chat_model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: request.schema_name,
                    strict: true,
                    schema: &request.schema,
                },
            },
            temperature: request.temperature,
        };

        tracing::debug!(
            target: "ghost::llm",
            model = %self.chat_model,
            schema = request.schema_name,
            "Requesting structured completion"
        );

        let parsed: ChatResponse = self.post_json("generation", "chat/completions", &body).await?;
        let message = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| GhostError::service("generation", "response had no choices"))?;

        if let Some(refusal) = message.refusal {
            return Err(GhostError::Validation(format!("model refused: {}", refusal)));
        }
        message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| GhostError::service("generation", "empty completion"))
    }
}

#[async_trait]
impl EmbeddingModel for OpenAiBridge {
    async fn embed(&self, text: &str) -> GhostResult<Vec<f32>> {
        tracing::debug!(
            target: "ghost::llm",
            model = %self.embedding_model,
            "Fetching embedding"
        );
        let body = EmbeddingsRequest {
            model: &self.embedding_model,
            input: text,
        };
        let parsed: EmbeddingsResponse = self.post_json("embedding", "embeddings", &body).await?;
        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| GhostError::service("embedding", "response had no data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_declares_strict_schema() {
        let schema = serde_json::json!({"type": "object"});
        let body = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage {
                role: "system",
                content: "sys",
            }],
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: "ghost_profile",
                    strict: true,
                    schema: &schema,
                },
            },
            temperature: None,
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["response_format"]["type"], "json_schema");
        assert_eq!(v["response_format"]["json_schema"]["name"], "ghost_profile");
        assert_eq!(v["response_format"]["json_schema"]["strict"], true);
        assert!(v.get("temperature").is_none());
    }

    #[test]
    fn blank_key_is_a_config_error() {
        let config = GhostConfig {
            api_key: Some("   ".into()),
            ..GhostConfig::default()
        };
        match OpenAiBridge::from_config(&config) {
            Err(e @ GhostError::Config(_)) => assert!(!e.is_transient()),
            Err(other) => panic!("expected Config, got {:?}", other),
            Ok(_) => panic!("bridge built without a key"),
        }
    }

    #[test]
    fn api_base_trailing_slash_is_trimmed() {
        let bridge = OpenAiBridge::new(" sk-test ").with_api_base("http://localhost:8080/v1/");
        assert_eq!(bridge.api_base, "http://localhost:8080/v1");
        assert_eq!(bridge.api_key, "sk-test");
    }
}
