//! Error taxonomy shared by every pipeline stage.
//!
//! Stages fail fast to their direct caller. Only the terminal steps (ghost upsert,
//! run insert) write durable state, so an error from any earlier stage leaves the
//! stores untouched.

/// Result type for ghost pipeline operations.
pub type GhostResult<T> = Result<T, GhostError>;

/// Errors surfaced by the ghost pipeline.
#[derive(Debug, thiserror::Error)]
pub enum GhostError {
    /// Generative output (or a bundled data file) failed schema conformance.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// An embedding, generation or store backend call failed.
    #[error("{service} service failed: {message}")]
    Service {
        service: &'static str,
        message: String,
    },

    /// Missing ghost, target or scenario.
    #[error("{0} not found")]
    NotFound(String),

    /// Caller identity could not be resolved.
    #[error("Unauthorized: {0}")]
    Authorization(String),

    /// A generative or embedding call exceeded its per-call deadline.
    #[error("{service} call timed out after {elapsed_ms}ms")]
    Timeout {
        service: &'static str,
        elapsed_ms: u64,
    },

    /// The persona slot or the simulation log rejected a write or read.
    #[error("Persistence failed: {0}")]
    Persistence(String),

    /// A required setting is missing or unusable.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GhostError {
    pub fn service(service: &'static str, message: impl Into<String>) -> Self {
        Self::Service {
            service,
            message: message.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// True for failures worth another attempt on a side-effect-free call.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Service { .. } | Self::Timeout { .. })
    }

    /// Generic text safe to show to an end user. The structured cause is logged instead.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "Requested ghost or scenario was not found",
            Self::Authorization(_) => "Unauthorized",
            Self::Validation(_) | Self::Service { .. } | Self::Timeout { .. } => {
                "The model could not produce a valid result. Please try again."
            }
            Self::Persistence(_) => "Could not save the result. Please try again.",
            Self::Config(_) => "The service is not configured",
        }
    }
}

impl From<sled::Error> for GhostError {
    fn from(e: sled::Error) -> Self {
        Self::Persistence(e.to_string())
    }
}

impl From<reqwest::Error> for GhostError {
    fn from(e: reqwest::Error) -> Self {
        Self::service("http", e.to_string())
    }
}
