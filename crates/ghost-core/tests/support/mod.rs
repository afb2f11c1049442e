//! Shared fakes for the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use ghost_core::llm::{GenerationRequest, GenerativeModel, HashEmbedder};
use ghost_core::{GhostConfig, GhostError, GhostProtocol, GhostResult, GhostStore};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Generative model that replays queued responses and records every request.
#[derive(Default)]
pub struct ScriptedModel {
    responses: Mutex<VecDeque<GhostResult<String>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, body: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Ok(body.into()));
    }

    pub fn push_err(&self, err: GhostError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate(&self, request: &GenerationRequest) -> GhostResult<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GhostError::service("generation", "script exhausted")))
    }
}

pub const EMBED_DIMS: usize = 32;

/// Protocol over a temp sled store, the scripted model and the hash embedder.
/// Synthesis and embedding get two attempts.
pub fn protocol(model: Arc<ScriptedModel>, seed: u64) -> (GhostProtocol, Arc<GhostStore>, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(GhostStore::open_path(dir.path().join("ghosts")).expect("open store"));
    let config = GhostConfig {
        embedding_dimensions: EMBED_DIMS,
        simulation_seed: Some(seed),
        max_attempts: 2,
        ..GhostConfig::default()
    };
    let protocol = GhostProtocol::new(
        model,
        Arc::new(HashEmbedder::new(EMBED_DIMS)),
        store.clone(),
        &config,
    );
    (protocol, store, dir)
}

pub fn profile_json(style: &str, bio: &str) -> String {
    serde_json::json!({
        "traits": ["Pragmatic", "Guarded", "Witty", "Restless", "Loyal"],
        "communication_style": style,
        "red_flags": ["Keeps score", "Vanishes under stress", "Workaholic"],
        "mating_value": 6.5,
        "short_bio": bio
    })
    .to_string()
}

pub fn simulation_json(score: u8, turns: usize) -> String {
    let dialogue: Vec<serde_json::Value> = (0..turns)
        .map(|i| {
            serde_json::json!({
                "speaker": if i % 2 == 0 { "A" } else { "B" },
                "text": format!("line {}", i),
                "action": if i == 0 { serde_json::Value::from("*sits down*") } else { serde_json::Value::Null }
            })
        })
        .collect();
    serde_json::json!({
        "score": score,
        "summary": "Sparks, then a fire alarm.",
        "dialogue": dialogue,
        "flags_triggered": ["Green: humour", "Red: phone checking"]
    })
    .to_string()
}
