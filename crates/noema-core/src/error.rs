use thiserror::Error;

/// Unified error type for the entire Noema governor.
///
/// Policy rejections by the governance pipeline are NOT errors: a
/// declined process simply ends in the `Terminated` state. Errors are
/// reserved for rejected submissions (capacity, disallowed type,
/// invalid trust input) and infrastructure anomalies.
#[derive(Error, Debug)]
pub enum NoemaError {
    // ── Trust & autonomy errors ────────────────────────────────
    #[error("trust score {0} is outside [0, 1]")]
    InvalidTrustScore(f64),

    #[error("no trust score available for agent {0}")]
    TrustUnavailable(String),

    #[error("tier '{tier}' may not initiate autonomous processes")]
    InitiationNotAllowed { tier: String },

    #[error("process type '{process_type}' is not allowed under tier '{tier}'")]
    ProcessTypeNotAllowed { tier: String, process_type: String },

    // ── Scheduler errors ───────────────────────────────────────
    #[error("concurrency limit reached: {active} of {limit} slots in use")]
    CapacityExhausted { active: usize, limit: usize },

    #[error("process not found: {0}")]
    ProcessNotFound(uuid::Uuid),

    #[error("invalid state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    // ── Engine errors ──────────────────────────────────────────
    #[error("engine failure for '{process_type}': {reason}")]
    Engine {
        process_type: String,
        reason: String,
    },

    // ── Config errors ──────────────────────────────────────────
    #[error("config error: {0}")]
    Config(String),

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, NoemaError>;
