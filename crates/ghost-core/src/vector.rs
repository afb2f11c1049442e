//! Similarity search interface over stored ghost embeddings.

use crate::error::GhostResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A ghost whose embedding cleared the similarity threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Owning user id of the matched ghost.
    pub ghost_id: String,
    /// Cosine similarity to the query (higher is closer).
    pub similarity: f32,
}

/// Query for [`VectorIndex::search`].
#[derive(Debug, Clone, Copy)]
pub struct SimilarityQuery<'a> {
    pub vector: &'a [f32],
    /// Minimum similarity, inclusive.
    pub threshold: f32,
    /// Maximum number of candidates returned.
    pub limit: usize,
    /// Ghost id to leave out of the results (usually the requester).
    pub exclude: Option<&'a str>,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Candidates ranked by descending similarity, all `>= threshold`, at most `limit`.
    async fn search(&self, query: SimilarityQuery<'_>) -> GhostResult<Vec<Candidate>>;
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut na = 0.0f32;
    let mut nb = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    let denom = na.sqrt() * nb.sqrt();
    if denom > 0.0 {
        dot / denom
    } else {
        0.0
    }
}

/// Scores `entries` against `query` and applies threshold, exclusion, ranking and cap.
/// Entries whose dimension differs from the query are skipped.
pub fn rank_candidates<'e, I>(query: &SimilarityQuery<'_>, entries: I) -> Vec<Candidate>
where
    I: IntoIterator<Item = (&'e str, &'e [f32])>,
{
    let mut scored: Vec<Candidate> = entries
        .into_iter()
        .filter(|(id, _)| query.exclude != Some(*id))
        .filter(|(_, v)| v.len() == query.vector.len())
        .map(|(id, v)| Candidate {
            ghost_id: id.to_string(),
            similarity: cosine_similarity(query.vector, v),
        })
        .filter(|c| c.similarity.is_finite() && c.similarity >= query.threshold)
        .collect();

    scored.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.ghost_id.cmp(&b.ghost_id))
    });
    scored.truncate(query.limit);
    scored
}
