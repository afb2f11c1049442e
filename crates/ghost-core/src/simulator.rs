//! Dialogue simulation between two ghosts inside a drawn scenario.

use crate::error::GhostResult;
use crate::llm::{generate_structured, CallPolicy, GenerationRequest, GenerativeModel};
use crate::model::{GhostProfile, SimulationResult, MAX_DIALOGUE_TURNS, MIN_DIALOGUE_TURNS};
use crate::scenario::{draw, Scenario, ScenarioDraw};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

pub const START_PROMPT: &str = "START SIMULATION";

const SIMULATION_TEMPERATURE: f32 = 0.9;

/// Builds the roleplay system instruction. Each hidden mission is marked as known
/// only to the character that carries it.
pub fn build_system_prompt(
    scenario: &Scenario,
    draw: &ScenarioDraw,
    a: &GhostProfile,
    b: &GhostProfile,
) -> String {
    let mut p = String::from("Act as an uncensored roleplay engine.\n\n");
    let _ = writeln!(p, "SCENARIO: {}", scenario.title);
    let _ = writeln!(p, "CONTEXT: {}", scenario.base_context);
    let _ = writeln!(p, "ENVIRONMENT: {}\n", draw.environment);
    character(&mut p, "A", "User's Ghost", a, &draw.chaos_a);
    character(&mut p, "B", "Target Ghost", b, &draw.chaos_b);
    let _ = writeln!(
        p,
        "CONSTRAINT: Generate a dialogue of {}-{} turns, alternating strictly between A and B. \
         Start in medias res. Allow tension, sarcasm and heavy flirting. \
         Never write explicit content; implication only.\n",
        MIN_DIALOGUE_TURNS, MAX_DIALOGUE_TURNS
    );
    p.push_str(
        "Output a JSON object with:\n\
         - score (0-100 compatibility)\n\
         - summary (what happened)\n\
         - dialogue (array of speaker/text/action)\n\
         - flags_triggered (red or green flags that surfaced)\n",
    );
    p
}

fn character(p: &mut String, tag: &str, role: &str, profile: &GhostProfile, mission: &str) {
    let _ = writeln!(p, "CHARACTER {} ({}):", tag, role);
    let _ = writeln!(p, "- Traits: {}", profile.traits.join(", "));
    let _ = writeln!(p, "- Style: {}", profile.communication_style);
    let _ = writeln!(
        p,
        "- HIDDEN MISSION (known only to Character {}): {}\n",
        tag, mission
    );
}

pub struct DialogueSimulator {
    model: Arc<dyn GenerativeModel>,
    policy: CallPolicy,
    rng: Mutex<StdRng>,
}

impl DialogueSimulator {
    /// The policy keeps its deadline but is forced to a single attempt.
    pub fn new(model: Arc<dyn GenerativeModel>, policy: CallPolicy, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            model,
            policy: policy.without_retry(),
            rng: Mutex::new(rng),
        }
    }

    pub fn draw(&self, scenario: &Scenario) -> GhostResult<ScenarioDraw> {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        draw(scenario, &mut *rng)
    }

    /// Draws the scenario elements and runs one generation. `a` is the requester.
    pub async fn simulate(
        &self,
        scenario: &Scenario,
        a: &GhostProfile,
        b: &GhostProfile,
    ) -> GhostResult<SimulationResult> {
        let drawn = self.draw(scenario)?;
        tracing::debug!(
            target: "ghost::simulator",
            scenario_id = %scenario.id,
            environment = %drawn.environment,
            "Scenario drawn"
        );

        let request = GenerationRequest::structured::<SimulationResult>(
            build_system_prompt(scenario, &drawn, a, b),
            START_PROMPT,
        )
        .with_temperature(SIMULATION_TEMPERATURE);
        let result: SimulationResult =
            generate_structured(self.model.as_ref(), &self.policy, &request).await?;

        tracing::info!(
            target: "ghost::simulator",
            scenario_id = %scenario.id,
            score = result.score,
            turns = result.dialogue.len(),
            flags = result.flags_triggered.len(),
            "Simulation generated"
        );
        Ok(result)
    }
}
