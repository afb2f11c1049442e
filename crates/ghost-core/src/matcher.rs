//! Vector candidate matching for a requester's ghost.

use crate::error::{GhostError, GhostResult};
use crate::store::PersonaStore;
use crate::vector::{Candidate, SimilarityQuery, VectorIndex};
use std::sync::Arc;

pub const MATCH_THRESHOLD: f32 = 0.5;
pub const MATCH_LIMIT: usize = 3;

pub struct CandidateMatcher {
    store: Arc<dyn PersonaStore>,
    index: Arc<dyn VectorIndex>,
}

impl CandidateMatcher {
    pub fn new(store: Arc<dyn PersonaStore>, index: Arc<dyn VectorIndex>) -> Self {
        Self { store, index }
    }

    /// Up to [`MATCH_LIMIT`] other ghosts at or above [`MATCH_THRESHOLD`], closest first.
    /// The requester is never among them. An empty list is a valid answer.
    pub async fn find_candidates(&self, user_id: &str) -> GhostResult<Vec<Candidate>> {
        let ghost = self
            .store
            .get_ghost(user_id)?
            .filter(|g| g.has_valid_embedding())
            .ok_or_else(|| GhostError::not_found(format!("ghost for user {}", user_id)))?;

        let candidates = self
            .index
            .search(SimilarityQuery {
                vector: &ghost.embedding,
                threshold: MATCH_THRESHOLD,
                limit: MATCH_LIMIT,
                exclude: Some(user_id),
            })
            .await?;

        tracing::info!(
            target: "ghost::matcher",
            user_id = %user_id,
            count = candidates.len(),
            top_similarity = candidates.first().map(|c| c.similarity),
            "Candidate search complete"
        );
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Ghost, GhostProfile};
    use crate::store::GhostStore;
    use chrono::Utc;

    fn ghost(user_id: &str, embedding: Vec<f32>) -> Ghost {
        Ghost {
            user_id: user_id.into(),
            profile: GhostProfile {
                traits: vec!["Calm".into(); 5],
                communication_style: "Warm".into(),
                red_flags: vec!["Late".into(); 3],
                mating_value: 5.0,
                short_bio: "I am here. I am fine.".into(),
            },
            embedding,
            updated_at: Utc::now(),
        }
    }

    fn matcher(ghosts: Vec<Ghost>) -> CandidateMatcher {
        let store = Arc::new(GhostStore::temporary().unwrap());
        for g in &ghosts {
            store.upsert_ghost(g).unwrap();
        }
        CandidateMatcher::new(store.clone(), store)
    }

    #[tokio::test]
    async fn excludes_self_and_caps_at_three() {
        let m = matcher(vec![
            ghost("me", vec![1.0, 0.0]),
            ghost("a", vec![0.99, 0.1]),
            ghost("b", vec![0.9, 0.3]),
            ghost("c", vec![0.8, 0.5]),
            ghost("d", vec![0.7, 0.6]),
            ghost("far", vec![-1.0, 0.0]),
        ]);
        let out = m.find_candidates("me").await.unwrap();
        let ids: Vec<&str> = out.iter().map(|c| c.ghost_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(out.iter().all(|c| c.similarity >= MATCH_THRESHOLD));
    }

    #[tokio::test]
    async fn no_neighbours_is_empty_success() {
        let m = matcher(vec![ghost("me", vec![1.0, 0.0]), ghost("x", vec![0.0, 1.0])]);
        assert!(m.find_candidates("me").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_or_unembedded_requester_is_not_found() {
        let m = matcher(vec![ghost("blank", vec![])]);
        for user in ["nobody", "blank"] {
            match m.find_candidates(user).await {
                Err(GhostError::NotFound(what)) => assert_eq!(what, format!("ghost for user {}", user)),
                other => panic!("expected NotFound, got {:?}", other),
            }
        }
    }
}
