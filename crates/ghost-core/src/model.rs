//! Domain records: the synthesized ghost profile, the stored ghost, and simulation runs.

use crate::llm::StructuredOutput;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TRAIT_COUNT: usize = 5;
pub const MIN_RED_FLAGS: usize = 3;
pub const MAX_RED_FLAGS: usize = 5;
pub const MAX_MATING_VALUE: f64 = 10.0;
pub const MIN_DIALOGUE_TURNS: usize = 8;
pub const MAX_DIALOGUE_TURNS: usize = 10;
pub const MAX_SCORE: u8 = 100;

/// Behavioral profile returned by the synthesis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GhostProfile {
    pub traits: Vec<String>,
    pub communication_style: String,
    pub red_flags: Vec<String>,
    /// Harsh-but-fair market value in `[0, 10]`.
    pub mating_value: f64,
    /// Two first-person sentences.
    pub short_bio: String,
}

impl StructuredOutput for GhostProfile {
    const SCHEMA_NAME: &'static str = "ghost_profile";

    fn json_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["traits", "communication_style", "red_flags", "mating_value", "short_bio"],
            "properties": {
                "traits": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": TRAIT_COUNT,
                    "maxItems": TRAIT_COUNT
                },
                "communication_style": { "type": "string" },
                "red_flags": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": MIN_RED_FLAGS,
                    "maxItems": MAX_RED_FLAGS
                },
                "mating_value": { "type": "number", "minimum": 0, "maximum": MAX_MATING_VALUE },
                "short_bio": { "type": "string" }
            }
        })
    }

    fn check(&self) -> Result<(), String> {
        if self.traits.len() != TRAIT_COUNT {
            return Err(format!(
                "expected {} traits, got {}",
                TRAIT_COUNT,
                self.traits.len()
            ));
        }
        if !(MIN_RED_FLAGS..=MAX_RED_FLAGS).contains(&self.red_flags.len()) {
            return Err(format!(
                "expected {}-{} red flags, got {}",
                MIN_RED_FLAGS,
                MAX_RED_FLAGS,
                self.red_flags.len()
            ));
        }
        if !self.mating_value.is_finite() || !(0.0..=MAX_MATING_VALUE).contains(&self.mating_value)
        {
            return Err(format!(
                "mating_value {} outside [0, {}]",
                self.mating_value, MAX_MATING_VALUE
            ));
        }
        Ok(())
    }
}

/// The single stored ghost for a user: profile plus its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ghost {
    pub user_id: String,
    pub profile: GhostProfile,
    pub embedding: Vec<f32>,
    pub updated_at: DateTime<Utc>,
}

impl Ghost {
    /// Eligible for matching: a non-empty, finite vector.
    pub fn has_valid_embedding(&self) -> bool {
        !self.embedding.is_empty() && self.embedding.iter().all(|x| x.is_finite())
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Speaker {
    /// The requester's ghost.
    A,
    /// The target ghost.
    B,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DialogueTurn {
    pub speaker: Speaker,
    pub text: String,
    /// Stage direction, e.g. "*leans back*".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// Scored transcript returned by the simulation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationResult {
    /// Compatibility in `[0, 100]`.
    pub score: u8,
    pub summary: String,
    pub dialogue: Vec<DialogueTurn>,
    pub flags_triggered: Vec<String>,
}

impl StructuredOutput for SimulationResult {
    const SCHEMA_NAME: &'static str = "simulation_result";

    fn json_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["score", "summary", "dialogue", "flags_triggered"],
            "properties": {
                "score": { "type": "integer", "minimum": 0, "maximum": MAX_SCORE },
                "summary": { "type": "string" },
                "dialogue": {
                    "type": "array",
                    "minItems": MIN_DIALOGUE_TURNS,
                    "maxItems": MAX_DIALOGUE_TURNS,
                    "items": {
                        "type": "object",
                        "additionalProperties": false,
                        "required": ["speaker", "text", "action"],
                        "properties": {
                            "speaker": { "type": "string", "enum": ["A", "B"] },
                            "text": { "type": "string" },
                            "action": { "type": ["string", "null"] }
                        }
                    }
                },
                "flags_triggered": { "type": "array", "items": { "type": "string" } }
            }
        })
    }

    fn check(&self) -> Result<(), String> {
        if self.score > MAX_SCORE {
            return Err(format!("score {} outside [0, {}]", self.score, MAX_SCORE));
        }
        let turns = self.dialogue.len();
        if !(MIN_DIALOGUE_TURNS..=MAX_DIALOGUE_TURNS).contains(&turns) {
            return Err(format!(
                "expected {}-{} dialogue turns, got {}",
                MIN_DIALOGUE_TURNS, MAX_DIALOGUE_TURNS, turns
            ));
        }
        if let Some(i) = self
            .dialogue
            .windows(2)
            .position(|w| w[0].speaker == w[1].speaker)
        {
            return Err(format!("turns {} and {} share a speaker", i, i + 1));
        }
        Ok(())
    }
}

/// Immutable record of one completed simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationRun {
    pub id: Uuid,
    pub user_id: String,
    pub target_ghost_id: String,
    pub scenario_id: String,
    pub result: SimulationResult,
    pub created_at: DateTime<Utc>,
}

impl SimulationRun {
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}
