//! Scenario catalog and the randomized draw of its sub-elements.

use crate::error::{GhostError, GhostResult};
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

static BUNDLED_CATALOG: Lazy<ScenarioCatalog> = Lazy::new(|| {
    ScenarioCatalog::from_json(include_str!("../data/scenarios.json"))
        .expect("bundled scenario catalog is malformed")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub base_context: String,
    pub environment_variables: Vec<String>,
    pub chaos_cards: Vec<String>,
}

/// Sub-elements drawn for one simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioDraw {
    pub environment: String,
    /// Hidden mission for the requester's ghost.
    pub chaos_a: String,
    /// Hidden mission for the target ghost.
    pub chaos_b: String,
}

/// Read-only scenario catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioCatalog {
    scenarios: Vec<Scenario>,
}

impl ScenarioCatalog {
    pub fn bundled() -> &'static ScenarioCatalog {
        &BUNDLED_CATALOG
    }

    pub fn from_json(raw: &str) -> GhostResult<Self> {
        let scenarios: Vec<Scenario> = serde_json::from_str(raw)
            .map_err(|e| GhostError::Validation(format!("scenario catalog: {}", e)))?;
        Self::new(scenarios)
    }

    /// Every scenario needs a unique id and at least one environment variable and
    /// chaos card, otherwise a draw would be impossible.
    pub fn new(scenarios: Vec<Scenario>) -> GhostResult<Self> {
        let mut seen = HashSet::new();
        for s in &scenarios {
            if !seen.insert(s.id.as_str()) {
                return Err(GhostError::Validation(format!(
                    "scenario catalog: duplicate id '{}'",
                    s.id
                )));
            }
            if s.environment_variables.is_empty() || s.chaos_cards.is_empty() {
                return Err(GhostError::Validation(format!(
                    "scenario catalog: '{}' needs environment variables and chaos cards",
                    s.id
                )));
            }
        }
        Ok(Self { scenarios })
    }

    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }
}

/// Draws one environment variable and, independently, two chaos cards with
/// replacement. Both sides may receive the same card.
pub fn draw<R: Rng + ?Sized>(scenario: &Scenario, rng: &mut R) -> GhostResult<ScenarioDraw> {
    let pick = |items: &[String], rng: &mut R, what: &str| {
        items.choose(rng).cloned().ok_or_else(|| {
            GhostError::Validation(format!("scenario '{}' has no {}", scenario.id, what))
        })
    };
    let environment = pick(&scenario.environment_variables, rng, "environment variables")?;
    let chaos_a = pick(&scenario.chaos_cards, rng, "chaos cards")?;
    let chaos_b = pick(&scenario.chaos_cards, rng, "chaos cards")?;
    Ok(ScenarioDraw {
        environment,
        chaos_a,
        chaos_b,
    })
}
