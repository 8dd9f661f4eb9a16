use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::process::{ProcessType, ResourceAllocation, StepRecord};

/// Everything an engine gets for one run: the request context, passed
/// through unmodified, plus the allocation it must stay within.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineInput {
    pub process_id: Uuid,
    pub agent_id: String,
    pub process_type: ProcessType,
    pub trigger: String,
    pub context: Value,
    pub allocation: ResourceAllocation,
}

/// What an engine produced. The content is opaque to the governance
/// core; only the resource figures are interpreted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineOutcome {
    pub summary: Option<String>,
    pub steps: Vec<StepRecord>,
    /// Final observed peak compute share, folded into the process usage.
    pub compute_pct: f64,
    /// Final observed peak memory, folded into the process usage.
    pub memory_mb: f64,
}

/// Executes the actual task body of one process type. One capability
/// with a type discriminant: the governor dispatches on
/// [`process_type`](CognitiveEngine::process_type), and invokes
/// [`run`](CognitiveEngine::run) exactly once per process.
#[async_trait]
pub trait CognitiveEngine: Send + Sync {
    fn process_type(&self) -> ProcessType;

    async fn run(&self, input: EngineInput) -> crate::Result<EngineOutcome>;
}
