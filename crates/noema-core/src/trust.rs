use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::{NoemaError, Result};

/// External source of agent trust scores. Computing the score is out of
/// scope for the governor; this is the seam it arrives through.
#[async_trait]
pub trait TrustProvider: Send + Sync {
    /// Returns the agent's trust score in `[0, 1]`, or
    /// [`NoemaError::TrustUnavailable`] when no score exists. Callers
    /// fall back to a configured safe default on that error.
    async fn trust_score(&self, agent_id: &str) -> Result<f64>;
}

/// Fixed score table. Agents not in the table get `TrustUnavailable`.
#[derive(Debug, Default)]
pub struct StaticTrustProvider {
    scores: HashMap<String, f64>,
}

impl StaticTrustProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(mut self, agent_id: impl Into<String>, score: f64) -> Self {
        self.scores.insert(agent_id.into(), score);
        self
    }

    pub fn set(&mut self, agent_id: impl Into<String>, score: f64) {
        self.scores.insert(agent_id.into(), score);
    }
}

#[async_trait]
impl TrustProvider for StaticTrustProvider {
    async fn trust_score(&self, agent_id: &str) -> Result<f64> {
        self.scores
            .get(agent_id)
            .copied()
            .ok_or_else(|| NoemaError::TrustUnavailable(agent_id.to_string()))
    }
}
