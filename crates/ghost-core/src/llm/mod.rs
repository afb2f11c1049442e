//! Generative-model and embedding capabilities.
//!
//! Stages depend only on the [`GenerativeModel`] and [`EmbeddingModel`] traits. The
//! OpenAI-compatible [`OpenAiBridge`] is the live adapter; [`HashEmbedder`] is a
//! deterministic offline embedder.

mod bridge;
mod hash_embedder;
mod policy;
mod structured;

pub use bridge::OpenAiBridge;
pub(crate) use bridge::{DEFAULT_API_BASE, DEFAULT_CHAT_MODEL, DEFAULT_EMBEDDING_MODEL};
pub use hash_embedder::HashEmbedder;
pub use policy::CallPolicy;
pub use structured::{parse_structured, StructuredOutput};

use crate::error::GhostResult;
use async_trait::async_trait;

/// One schema-constrained generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
    pub schema_name: &'static str,
    pub schema: serde_json::Value,
    pub temperature: Option<f32>,
}

impl GenerationRequest {
    /// Request whose declared output schema is `T`'s.
    pub fn structured<T: StructuredOutput>(
        system: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            schema_name: T::SCHEMA_NAME,
            schema: T::json_schema(),
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Accepts (system instruction, content, declared schema) and returns the raw
/// structured text. Conformance is checked by [`parse_structured`], not here.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> GhostResult<String>;
}

/// Text to fixed-dimension vector.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    async fn embed(&self, text: &str) -> GhostResult<Vec<f32>>;
}

/// Runs `request` under `policy` and passes the response through the schema gate.
/// A response that fails the gate is not retried.
pub async fn generate_structured<T: StructuredOutput>(
    model: &dyn GenerativeModel,
    policy: &CallPolicy,
    request: &GenerationRequest,
) -> GhostResult<T> {
    let raw = policy
        .run("generation", move || model.generate(request))
        .await?;
    parse_structured(&raw)
}
