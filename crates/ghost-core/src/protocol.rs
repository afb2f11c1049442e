//! Top-level operations: ghost genesis, candidate search and simulations.
//!
//! Each operation resolves the caller, runs its stages in order and fails fast. Only
//! the terminal stage of an operation writes to the store, so a failure anywhere
//! earlier leaves persisted state exactly as it was.

use crate::config::GhostConfig;
use crate::error::{GhostError, GhostResult};
use crate::indexer::EmbeddingIndexer;
use crate::llm::{CallPolicy, EmbeddingModel, GenerativeModel, OpenAiBridge};
use crate::matcher::CandidateMatcher;
use crate::model::{Ghost, SimulationResult, SimulationRun};
use crate::questionnaire::{compile, AnswerSet, QuestionBank};
use crate::recorder::SimulationRecorder;
use crate::scenario::ScenarioCatalog;
use crate::simulator::DialogueSimulator;
use crate::store::{GhostStore, PersonaStore, SimulationStore};
use crate::synthesizer::PersonaSynthesizer;
use crate::vector::{Candidate, VectorIndex};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Id of the stored run plus its result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    pub run_id: Uuid,
    pub result: SimulationResult,
}

pub struct GhostProtocol {
    bank: QuestionBank,
    catalog: ScenarioCatalog,
    personas: Arc<dyn PersonaStore>,
    synthesizer: PersonaSynthesizer,
    indexer: EmbeddingIndexer,
    matcher: CandidateMatcher,
    simulator: DialogueSimulator,
    recorder: SimulationRecorder,
}

impl GhostProtocol {
    /// Wires the stages over one store that serves ghosts, runs and vector search.
    pub fn new<S>(
        generator: Arc<dyn GenerativeModel>,
        embedder: Arc<dyn EmbeddingModel>,
        store: Arc<S>,
        config: &GhostConfig,
    ) -> Self
    where
        S: PersonaStore + SimulationStore + VectorIndex + 'static,
    {
        let policy: CallPolicy = config.call_policy();
        let personas: Arc<dyn PersonaStore> = store.clone();
        let runs: Arc<dyn SimulationStore> = store.clone();
        let index: Arc<dyn VectorIndex> = store;
        Self {
            bank: QuestionBank::bundled().clone(),
            catalog: ScenarioCatalog::bundled().clone(),
            synthesizer: PersonaSynthesizer::new(generator.clone(), policy),
            indexer: EmbeddingIndexer::new(embedder, personas.clone(), policy)
                .with_expected_dimensions(config.expected_dimensions()),
            matcher: CandidateMatcher::new(personas.clone(), index),
            simulator: DialogueSimulator::new(generator, policy, config.simulation_seed),
            recorder: SimulationRecorder::new(runs),
            personas,
        }
    }

    /// Live wiring: OpenAI-compatible bridge for both capabilities and a sled store at
    /// `storage_path`.
    pub fn from_config(config: &GhostConfig) -> GhostResult<Self> {
        let bridge = Arc::new(OpenAiBridge::from_config(config)?);
        let store = Arc::new(GhostStore::open_path(&config.storage_path)?);
        tracing::info!(
            target: "ghost::protocol",
            storage_path = %config.storage_path,
            chat_model = %config.chat_model,
            embedding_model = %config.embedding_model,
            "Ghost protocol ready"
        );
        Ok(Self::new(bridge.clone(), bridge, store, config))
    }

    pub fn with_question_bank(mut self, bank: QuestionBank) -> Self {
        self.bank = bank;
        self
    }

    pub fn with_scenarios(mut self, catalog: ScenarioCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn question_bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn scenarios(&self) -> &ScenarioCatalog {
        &self.catalog
    }

    /// Questionnaire answers to a stored ghost. Re-running replaces the user's ghost.
    pub async fn genesis(&self, user_id: &str, answers: &AnswerSet) -> GhostResult<Ghost> {
        logged("genesis", user_id, self.genesis_inner(user_id, answers).await)
    }

    pub async fn find_candidates(&self, user_id: &str) -> GhostResult<Vec<Candidate>> {
        let outcome = match authorize(user_id) {
            Ok(user_id) => self.matcher.find_candidates(user_id).await,
            Err(e) => Err(e),
        };
        logged("find_candidates", user_id, outcome)
    }

    /// Simulates the caller's ghost against `target_id` in `scenario_id` and records
    /// the run. Every call creates a new run.
    pub async fn run_simulation(
        &self,
        user_id: &str,
        target_id: &str,
        scenario_id: &str,
    ) -> GhostResult<SimulationOutcome> {
        let outcome = self
            .run_simulation_inner(user_id, target_id, scenario_id)
            .await;
        logged("run_simulation", user_id, outcome)
    }

    /// Point read of a recorded run.
    pub fn simulation(&self, run_id: &Uuid) -> GhostResult<Option<SimulationRun>> {
        self.recorder.get(run_id)
    }

    async fn genesis_inner(&self, user_id: &str, answers: &AnswerSet) -> GhostResult<Ghost> {
        let user_id = authorize(user_id)?;
        let document = compile(answers, &self.bank);
        let profile = self.synthesizer.synthesize(&document).await?;
        self.indexer.index(user_id, profile).await
    }

    /// Ghosts and scenario are resolved before the generative call.
    async fn run_simulation_inner(
        &self,
        user_id: &str,
        target_id: &str,
        scenario_id: &str,
    ) -> GhostResult<SimulationOutcome> {
        let user_id = authorize(user_id)?;
        let own = self
            .personas
            .get_ghost(user_id)?
            .ok_or_else(|| GhostError::not_found(format!("ghost for user {}", user_id)))?;
        let target = self
            .personas
            .get_ghost(target_id)?
            .ok_or_else(|| GhostError::not_found(format!("ghost {}", target_id)))?;
        let scenario = self
            .catalog
            .get(scenario_id)
            .ok_or_else(|| GhostError::not_found(format!("scenario '{}'", scenario_id)))?;

        let result = self
            .simulator
            .simulate(scenario, &own.profile, &target.profile)
            .await?;
        let run = self.recorder.record(user_id, target_id, scenario_id, result)?;
        tracing::info!(
            target: "ghost::protocol",
            run_id = %run.id,
            user_id = %user_id,
            target_id = %target_id,
            scenario_id = %scenario_id,
            score = run.result.score,
            "Simulation complete"
        );
        Ok(SimulationOutcome {
            run_id: run.id,
            result: run.result,
        })
    }
}

/// Rejects a blank caller. A non-blank id is used exactly as given, since resolving
/// identities belongs to the caller's auth layer.
fn authorize(user_id: &str) -> GhostResult<&str> {
    if user_id.trim().is_empty() {
        return Err(GhostError::Authorization("no caller identity".into()));
    }
    Ok(user_id)
}

fn logged<T>(operation: &'static str, user_id: &str, outcome: GhostResult<T>) -> GhostResult<T> {
    if let Err(e) = &outcome {
        tracing::error!(
            target: "ghost::protocol",
            operation,
            user_id = %user_id,
            error = %e,
            "{} failed: {}",
            operation,
            e.public_message()
        );
    }
    outcome
}
