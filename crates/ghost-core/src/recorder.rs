use crate::error::GhostResult;
use crate::model::{SimulationResult, SimulationRun};
use crate::store::SimulationStore;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Persists completed simulations as new immutable runs.
pub struct SimulationRecorder {
    store: Arc<dyn SimulationStore>,
}

impl SimulationRecorder {
    pub fn new(store: Arc<dyn SimulationStore>) -> Self {
        Self { store }
    }

    /// Always creates a new run with a fresh id; the result is never merged into an
    /// earlier one.
    pub fn record(
        &self,
        user_id: &str,
        target_ghost_id: &str,
        scenario_id: &str,
        result: SimulationResult,
    ) -> GhostResult<SimulationRun> {
        let run = SimulationRun {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            target_ghost_id: target_ghost_id.to_string(),
            scenario_id: scenario_id.to_string(),
            result,
            created_at: Utc::now(),
        };
        self.store.insert_run(&run)?;
        Ok(run)
    }

    pub fn get(&self, id: &Uuid) -> GhostResult<Option<SimulationRun>> {
        self.store.get_run(id)
    }
}
