//! Ghost configuration loaded from TOML and environment.
//!
//! | Key (env `GHOST_<KEY>`) | Default | Description |
//! |-------------------------|---------|-------------|
//! | storage_path | ./data/ghost_store | sled directory for ghosts and simulation runs |
//! | api_base | https://api.openai.com/v1 | OpenAI-compatible endpoint |
//! | api_key | (unset, falls back to OPENAI_API_KEY) | provider key |
//! | chat_model | gpt-4o-mini | model for synthesis and simulation |
//! | embedding_model | text-embedding-3-small | model for ghost digests |
//! | embedding_dimensions | 1536 | expected vector length; 0 disables the check |
//! | request_timeout_secs | 60 | per-call deadline for model calls |
//! | max_attempts | 1 | attempts for synthesis/embedding calls (1 = no retry) |
//! | simulation_seed | (unset) | fixed seed for scenario draws |

use crate::llm::CallPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const ENV_CONFIG_PATH: &str = "GHOST_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/ghost.toml";
const ENV_FALLBACK_API_KEY: &str = "OPENAI_API_KEY";

fn default_storage_path() -> String {
    "./data/ghost_store".to_string()
}

fn default_api_base() -> String {
    crate::llm::DEFAULT_API_BASE.to_string()
}

fn default_chat_model() -> String {
    crate::llm::DEFAULT_CHAT_MODEL.to_string()
}

fn default_embedding_model() -> String {
    crate::llm::DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_embedding_dimensions() -> usize {
    1536
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GhostConfig {
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default)]
    pub simulation_seed: Option<u64>,
}

impl Default for GhostConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            api_base: default_api_base(),
            api_key: None,
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: default_embedding_dimensions(),
            request_timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            simulation_seed: None,
        }
    }
}

impl GhostConfig {
    /// Load from `.env`, the TOML file and `GHOST_*` environment variables.
    /// Precedence: env > file (`GHOST_CONFIG` path, else `config/ghost.toml`) > defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let _ = dotenvy::dotenv();
        let path = std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path))
    }

    /// Load with an explicit file path (skipped when it does not exist).
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder();
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };
        let built = builder
            .add_source(
                config::Environment::with_prefix("GHOST")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        built.try_deserialize()
    }

    /// Configured key, falling back to `OPENAI_API_KEY`. Blank values count as unset.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(ENV_FALLBACK_API_KEY).ok())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Policy for side-effect-free synthesis and embedding calls.
    pub fn call_policy(&self) -> CallPolicy {
        CallPolicy::new(self.request_timeout(), self.max_attempts)
    }

    /// Expected embedding length, `None` when the check is disabled.
    pub fn expected_dimensions(&self) -> Option<usize> {
        (self.embedding_dimensions > 0).then_some(self.embedding_dimensions)
    }

    /// Settings that must be present before live calls can succeed.
    pub fn missing_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.resolved_api_key().is_none() {
            missing.push("api_key (GHOST_API_KEY or OPENAI_API_KEY)");
        }
        if self.api_base.trim().is_empty() {
            missing.push("api_base");
        }
        if self.storage_path.trim().is_empty() {
            missing.push("storage_path");
        }
        missing
    }
}
