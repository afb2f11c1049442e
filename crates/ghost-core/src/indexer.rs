//! Embeds a ghost profile digest and upserts the ghost into its per-user slot.

use crate::error::{GhostError, GhostResult};
use crate::llm::{CallPolicy, EmbeddingModel};
use crate::model::{Ghost, GhostProfile};
use crate::store::{PersonaStore, UpsertOutcome};
use chrono::Utc;
use std::sync::Arc;

/// Canonical embedding input: bio, then traits, then red flags.
pub fn digest(profile: &GhostProfile) -> String {
    format!(
        "Bio: {}. Traits: {}. Red Flags: {}.",
        profile.short_bio,
        profile.traits.join(", "),
        profile.red_flags.join(", ")
    )
}

pub struct EmbeddingIndexer {
    embedder: Arc<dyn EmbeddingModel>,
    store: Arc<dyn PersonaStore>,
    policy: CallPolicy,
    expected_dimensions: Option<usize>,
}

impl EmbeddingIndexer {
    pub fn new(
        embedder: Arc<dyn EmbeddingModel>,
        store: Arc<dyn PersonaStore>,
        policy: CallPolicy,
    ) -> Self {
        Self {
            embedder,
            store,
            policy,
            expected_dimensions: None,
        }
    }

    /// Reject vectors whose length differs from `dims`.
    pub fn with_expected_dimensions(mut self, dims: Option<usize>) -> Self {
        self.expected_dimensions = dims;
        self
    }

    pub async fn embed_profile(&self, profile: &GhostProfile) -> GhostResult<Vec<f32>> {
        let text = digest(profile);
        let embedder = self.embedder.as_ref();
        let text_ref = text.as_str();
        let vector = self
            .policy
            .run("embedding", move || embedder.embed(text_ref))
            .await?;
        self.check_vector(&vector)?;
        Ok(vector)
    }

    /// Embeds then persists. Nothing is written unless the embedding succeeded.
    pub async fn index(&self, user_id: &str, profile: GhostProfile) -> GhostResult<Ghost> {
        let embedding = self.embed_profile(&profile).await?;
        let ghost = Ghost {
            user_id: user_id.to_string(),
            profile,
            embedding,
            updated_at: Utc::now(),
        };
        let outcome = self.store.upsert_ghost(&ghost)?;
        tracing::info!(
            target: "ghost::indexer",
            user_id = %user_id,
            dims = ghost.embedding.len(),
            replaced = outcome == UpsertOutcome::Replaced,
            "Ghost indexed"
        );
        Ok(ghost)
    }

    fn check_vector(&self, vector: &[f32]) -> GhostResult<()> {
        if vector.is_empty() {
            return Err(GhostError::service("embedding", "empty embedding vector"));
        }
        if vector.iter().any(|x| !x.is_finite()) {
            return Err(GhostError::service("embedding", "non-finite embedding value"));
        }
        if let Some(dims) = self.expected_dimensions {
            if vector.len() != dims {
                return Err(GhostError::service(
                    "embedding",
                    format!("expected {} dimensions, got {}", dims, vector.len()),
                ));
            }
        }
        Ok(())
    }
}
