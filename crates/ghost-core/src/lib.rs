//! ghost-core: questionnaire to AI persona ("ghost"), vector matching between ghosts,
//! and scored dialogue simulations inside randomized scenarios.
//!
//! [`GhostProtocol`] is the entry point; the stage types are exported for callers that
//! wire their own pipeline or substitute model adapters.

mod config;
mod error;
mod indexer;
pub mod llm;
mod matcher;
mod model;
mod protocol;
pub mod questionnaire;
mod recorder;
pub mod scenario;
mod simulator;
mod store;
mod synthesizer;
mod vector;

// Configuration & errors
pub use config::GhostConfig;
pub use error::{GhostError, GhostResult};

// Domain records
pub use model::{
    DialogueTurn, Ghost, GhostProfile, SimulationResult, SimulationRun, Speaker, MAX_DIALOGUE_TURNS,
    MAX_MATING_VALUE, MAX_RED_FLAGS, MAX_SCORE, MIN_DIALOGUE_TURNS, MIN_RED_FLAGS, TRAIT_COUNT,
};

// Pipeline stages
pub use indexer::{digest, EmbeddingIndexer};
pub use matcher::{CandidateMatcher, MATCH_LIMIT, MATCH_THRESHOLD};
pub use recorder::SimulationRecorder;
pub use scenario::{Scenario, ScenarioCatalog, ScenarioDraw};
pub use simulator::{build_system_prompt, DialogueSimulator, START_PROMPT};
pub use synthesizer::PersonaSynthesizer;

// Storage & search
pub use store::{GhostStore, PersonaStore, SimulationStore, UpsertOutcome};
pub use vector::{cosine_similarity, rank_candidates, Candidate, SimilarityQuery, VectorIndex};

// Facade
pub use protocol::{GhostProtocol, SimulationOutcome};
