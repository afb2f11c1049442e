//! Persona synthesis: one schema-constrained generative call over the analysis document.

use crate::error::GhostResult;
use crate::llm::{generate_structured, CallPolicy, GenerationRequest, GenerativeModel};
use crate::model::GhostProfile;
use crate::questionnaire::AnalysisDocument;
use std::sync::Arc;

const SYSTEM_INSTRUCTION: &str = "\
You are an unsentimental evolutionary psychologist and dating coach.
Read the user's questionnaire answers and build a Ghost Profile: an AI persona that
represents their true, unfiltered self on the dating market.

Be analytical, not polite. Look for inconsistencies, red flags and hidden desires.

OUTPUT REQUIREMENTS:
- traits: exactly 5 adjectives describing their core personality (e.g. \"Pragmatic\", \"Insecure\").
- communication_style: how they talk (e.g. \"Flirty and sarcastic\", \"Passive-aggressive and shy\").
- red_flags: 3-5 specific behaviors or risks found in their answers (e.g. \"Fear of commitment\").
- mating_value: a number from 0 to 10 for their market value based on confidence, resources and stability. Harsh but fair.
- short_bio: two sentences in the first person (\"I am...\"), written like an internal monologue.";

const SYNTHESIS_TEMPERATURE: f32 = 0.7;

pub struct PersonaSynthesizer {
    model: Arc<dyn GenerativeModel>,
    policy: CallPolicy,
}

impl PersonaSynthesizer {
    pub fn new(model: Arc<dyn GenerativeModel>, policy: CallPolicy) -> Self {
        Self { model, policy }
    }

    /// Produces a profile that has passed the schema gate, or fails as a whole.
    pub async fn synthesize(&self, document: &AnalysisDocument) -> GhostResult<GhostProfile> {
        let request =
            GenerationRequest::structured::<GhostProfile>(SYSTEM_INSTRUCTION, document.as_str())
                .with_temperature(SYNTHESIS_TEMPERATURE);

        tracing::debug!(
            target: "ghost::synthesizer",
            document_bytes = document.as_str().len(),
            "Requesting ghost profile"
        );
        let profile: GhostProfile =
            generate_structured(self.model.as_ref(), &self.policy, &request).await?;
        tracing::info!(
            target: "ghost::synthesizer",
            traits = profile.traits.len(),
            red_flags = profile.red_flags.len(),
            mating_value = profile.mating_value,
            "Ghost profile synthesized"
        );
        Ok(profile)
    }
}
