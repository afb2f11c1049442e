//! Sled-backed persistence: one overwritable ghost slot per user and an
//! append-only simulation log.
//!
//! | Tree          | Key        | Value                   | Write mode                  |
//! |---------------|------------|-------------------------|-----------------------------|
//! | `ghosts`      | user id    | [`Ghost`] (JSON)        | upsert, last write wins     |
//! | `simulations` | run UUID   | [`SimulationRun`] (JSON)| insert-if-absent, immutable |

use crate::error::{GhostError, GhostResult};
use crate::model::{Ghost, SimulationRun};
use crate::vector::{rank_candidates, Candidate, SimilarityQuery, VectorIndex};
use async_trait::async_trait;
use sled::Db;
use std::path::Path;
use uuid::Uuid;

const GHOSTS_TREE: &str = "ghosts";
const SIMULATIONS_TREE: &str = "simulations";

/// Whether an upsert created the slot or replaced an existing ghost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
}

/// Point read and upsert-by-user-id for ghosts.
pub trait PersonaStore: Send + Sync {
    fn get_ghost(&self, user_id: &str) -> GhostResult<Option<Ghost>>;

    /// Replaces the user's ghost wholesale, or creates it.
    fn upsert_ghost(&self, ghost: &Ghost) -> GhostResult<UpsertOutcome>;

    fn ghost_count(&self) -> GhostResult<usize>;
}

/// Append-only simulation log.
pub trait SimulationStore: Send + Sync {
    /// Inserts a new run. An existing id is never overwritten.
    fn insert_run(&self, run: &SimulationRun) -> GhostResult<()>;

    fn get_run(&self, id: &Uuid) -> GhostResult<Option<SimulationRun>>;

    fn run_count(&self) -> GhostResult<usize>;
}

pub struct GhostStore {
    db: Db,
}

impl GhostStore {
    /// Opens or creates the store at `path`.
    pub fn open_path<P: AsRef<Path>>(path: P) -> GhostResult<Self> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// In-memory store removed on drop.
    pub fn temporary() -> GhostResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    pub fn flush(&self) -> GhostResult<()> {
        self.db.flush()?;
        Ok(())
    }

    fn ghosts(&self) -> GhostResult<sled::Tree> {
        Ok(self.db.open_tree(GHOSTS_TREE)?)
    }

    fn simulations(&self) -> GhostResult<sled::Tree> {
        Ok(self.db.open_tree(SIMULATIONS_TREE)?)
    }

    fn scan_ghosts(&self) -> GhostResult<Vec<Ghost>> {
        let mut out = Vec::new();
        for item in self.ghosts()?.iter() {
            let (key, bytes) = item?;
            match Ghost::from_bytes(&bytes) {
                Ok(ghost) => out.push(ghost),
                Err(e) => tracing::warn!(
                    target: "ghost::store",
                    key = %String::from_utf8_lossy(&key),
                    error = %e,
                    "Skipping undecodable ghost record"
                ),
            }
        }
        Ok(out)
    }
}

impl PersonaStore for GhostStore {
    fn get_ghost(&self, user_id: &str) -> GhostResult<Option<Ghost>> {
        let Some(bytes) = self.ghosts()?.get(user_id.as_bytes())? else {
            return Ok(None);
        };
        Ghost::from_bytes(&bytes)
            .map(Some)
            .map_err(|e| GhostError::Persistence(format!("corrupt ghost '{}': {}", user_id, e)))
    }

    fn upsert_ghost(&self, ghost: &Ghost) -> GhostResult<UpsertOutcome> {
        let bytes = ghost
            .to_bytes()
            .map_err(|e| GhostError::Persistence(e.to_string()))?;
        let prev = self.ghosts()?.insert(ghost.user_id.as_bytes(), bytes.as_slice())?;
        let outcome = if prev.is_some() {
            UpsertOutcome::Replaced
        } else {
            UpsertOutcome::Inserted
        };
        tracing::info!(
            target: "ghost::store",
            user_id = %ghost.user_id,
            bytes = bytes.len(),
            action = if prev.is_some() { "UPDATE" } else { "INSERT" },
            "Ghost slot {} for user '{}'",
            if prev.is_some() { "replaced" } else { "created" },
            ghost.user_id
        );
        Ok(outcome)
    }

    fn ghost_count(&self) -> GhostResult<usize> {
        Ok(self.ghosts()?.len())
    }
}

impl SimulationStore for GhostStore {
    fn insert_run(&self, run: &SimulationRun) -> GhostResult<()> {
        let bytes = run
            .to_bytes()
            .map_err(|e| GhostError::Persistence(e.to_string()))?;
        let key = run.id.as_bytes();
        self.simulations()?
            .compare_and_swap(key, None as Option<&[u8]>, Some(bytes.as_slice()))?
            .map_err(|_| GhostError::Persistence(format!("simulation run {} already exists", run.id)))?;
        tracing::info!(
            target: "ghost::store",
            run_id = %run.id,
            user_id = %run.user_id,
            scenario_id = %run.scenario_id,
            action = "INSERT",
            "Simulation run recorded"
        );
        Ok(())
    }

    fn get_run(&self, id: &Uuid) -> GhostResult<Option<SimulationRun>> {
        let Some(bytes) = self.simulations()?.get(id.as_bytes())? else {
            return Ok(None);
        };
        SimulationRun::from_bytes(&bytes)
            .map(Some)
            .map_err(|e| GhostError::Persistence(format!("corrupt simulation run {}: {}", id, e)))
    }

    fn run_count(&self) -> GhostResult<usize> {
        Ok(self.simulations()?.len())
    }
}

/// Brute-force cosine scan over every stored ghost with a valid embedding.
#[async_trait]
impl VectorIndex for GhostStore {
    async fn search(&self, query: SimilarityQuery<'_>) -> GhostResult<Vec<Candidate>> {
        let ghosts = self.scan_ghosts()?;
        let eligible = ghosts
            .iter()
            .filter(|g| g.has_valid_embedding())
            .map(|g| (g.user_id.as_str(), g.embedding.as_slice()));
        Ok(rank_candidates(&query, eligible))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DialogueTurn, GhostProfile, SimulationResult, Speaker};
    use chrono::Utc;

    fn ghost(user_id: &str, embedding: Vec<f32>, style: &str) -> Ghost {
        Ghost {
            user_id: user_id.to_string(),
            profile: GhostProfile {
                traits: vec!["Guarded".into(); 5],
                communication_style: style.to_string(),
                red_flags: vec!["Stonewalls".into(); 3],
                mating_value: 6.5,
                short_bio: "I keep people at arm's length. I call it taste.".into(),
            },
            embedding,
            updated_at: Utc::now(),
        }
    }

    fn run(id: Uuid) -> SimulationRun {
        SimulationRun {
            id,
            user_id: "alice".into(),
            target_ghost_id: "bob".into(),
            scenario_id: "dinner_date".into(),
            result: SimulationResult {
                score: 42,
                summary: "Awkward.".into(),
                dialogue: (0..8)
                    .map(|i| DialogueTurn {
                        speaker: if i % 2 == 0 { Speaker::A } else { Speaker::B },
                        text: format!("line {}", i),
                        action: None,
                    })
                    .collect(),
                flags_triggered: vec![],
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn upsert_overwrites_single_slot() {
        let dir = tempfile::tempdir().unwrap();
        let store = GhostStore::open_path(dir.path()).unwrap();

        let first = ghost("alice", vec![1.0, 0.0], "Blunt");
        assert_eq!(store.upsert_ghost(&first).unwrap(), UpsertOutcome::Inserted);
        let second = ghost("alice", vec![0.0, 1.0], "Sarcastic");
        assert_eq!(store.upsert_ghost(&second).unwrap(), UpsertOutcome::Replaced);

        assert_eq!(store.ghost_count().unwrap(), 1);
        let loaded = store.get_ghost("alice").unwrap().unwrap();
        assert_eq!(loaded.profile.communication_style, "Sarcastic");
        assert_eq!(loaded.embedding, vec![0.0, 1.0]);
        assert!(store.get_ghost("nobody").unwrap().is_none());
    }

    #[test]
    fn runs_are_append_only() {
        let store = GhostStore::temporary().unwrap();
        let id = Uuid::new_v4();
        store.insert_run(&run(id)).unwrap();

        let mut clash = run(id);
        clash.result.score = 99;
        assert!(matches!(
            store.insert_run(&clash),
            Err(GhostError::Persistence(_))
        ));

        let stored = store.get_run(&id).unwrap().unwrap();
        assert_eq!(stored.result.score, 42);
        assert_eq!(store.run_count().unwrap(), 1);
        assert!(store.get_run(&Uuid::new_v4()).unwrap().is_none());
    }

    #[tokio::test]
    async fn search_skips_ghosts_without_embeddings() {
        let store = GhostStore::temporary().unwrap();
        store.upsert_ghost(&ghost("alice", vec![1.0, 0.0], "x")).unwrap();
        store.upsert_ghost(&ghost("bob", vec![0.9, 0.1], "x")).unwrap();
        store.upsert_ghost(&ghost("carol", vec![], "x")).unwrap();
        store.upsert_ghost(&ghost("dave", vec![1.0, 0.0, 0.0], "x")).unwrap();

        let q = [1.0f32, 0.0];
        let hits = store
            .search(SimilarityQuery {
                vector: &q,
                threshold: 0.5,
                limit: 3,
                exclude: Some("alice"),
            })
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].ghost_id, "bob");
    }
}
