use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use crate::error::{NoemaError, Result};
use crate::gate::{
    ConflictEscalation, GovernanceCheck, QuestioningVerdict, RiskVerdict, SafetyVerdict,
};

/// Unique identifier for a process.
pub type ProcessId = Uuid;

/// Identifier of the agent that owns a process.
pub type AgentId = String;

/// The closed set of autonomous cognitive task kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessType {
    Exploration,
    Synthesis,
    EthicalReview,
    Reflection,
}

impl ProcessType {
    pub const ALL: [ProcessType; 4] = [
        Self::Exploration,
        Self::Synthesis,
        Self::EthicalReview,
        Self::Reflection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exploration => "exploration",
            Self::Synthesis => "synthesis",
            Self::EthicalReview => "ethical_review",
            Self::Reflection => "reflection",
        }
    }
}

impl fmt::Display for ProcessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle states of an autonomous process.
///
/// `pending → approved → running → {completed | failed | terminated}`,
/// with `terminated` reachable from any non-terminal state. Terminal
/// states are final: no further mutation of state, usage, or outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    Pending,
    Approved,
    Running,
    Completed,
    Failed,
    Terminated,
}

impl ProcessState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Terminated)
    }

    pub fn can_transition(self, to: ProcessState) -> bool {
        use ProcessState::*;
        matches!(
            (self, to),
            (Pending, Approved)
                | (Approved, Running)
                | (Running, Completed)
                | (Running, Failed)
                | (Pending, Terminated)
                | (Approved, Terminated)
                | (Running, Terminated)
        )
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Terminated => "terminated",
        };
        write!(f, "{s}")
    }
}

/// A request to launch an autonomous process on behalf of an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub agent_id: AgentId,
    pub process_type: ProcessType,
    /// Free-form reason the agent gives for wanting this process.
    pub trigger: String,
    /// Opaque context blob, passed through to the engine unmodified.
    pub context: Value,
}

/// Pre-approved resource ceiling for one process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceAllocation {
    pub compute_pct: f64,
    pub time_budget_secs: u64,
    pub memory_ceiling_mb: u64,
    /// Conservative by default: no network unless explicitly granted.
    #[serde(default)]
    pub network_access: bool,
    #[serde(default)]
    pub tool_allowlist: Vec<String>,
}

/// Live consumption recorded while the process runs. Peak values only
/// ever go up, and freeze once the process reaches a terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub compute_pct: f64,
    pub memory_mb: f64,
}

/// One engine-produced step. Opaque to the governance core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub at: DateTime<Utc>,
    pub label: String,
    #[serde(default)]
    pub detail: Value,
}

/// The central entity: one instance of an agent-initiated autonomous
/// cognitive task, tracked through its state machine. Created from a
/// [`ProcessRequest`]; mutated only by the pipeline, scheduler, and
/// monitor, all of which go through the guarded methods below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutonomousProcess {
    pub id: ProcessId,
    pub agent_id: AgentId,
    pub process_type: ProcessType,
    pub state: ProcessState,
    pub trigger: String,
    pub context: Value,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub allocation: Option<ResourceAllocation>,
    pub usage: ResourceUsage,
    /// Set only on non-success terminal states.
    pub termination_reason: Option<String>,
    pub steps: Vec<StepRecord>,
    pub outcome_summary: Option<String>,
    /// Stage verdicts attached as the process passes the pipeline.
    pub safety: Option<SafetyVerdict>,
    pub questioning: Option<QuestioningVerdict>,
    pub risk: Option<RiskVerdict>,
    pub checks: Vec<GovernanceCheck>,
    pub escalations: Vec<ConflictEscalation>,
    /// Advisory marker; does not change the state.
    pub escalated: bool,
}

impl AutonomousProcess {
    pub fn from_request(request: ProcessRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            agent_id: request.agent_id,
            process_type: request.process_type,
            state: ProcessState::Pending,
            trigger: request.trigger,
            context: request.context,
            created_at: Utc::now(),
            started_at: None,
            ended_at: None,
            allocation: None,
            usage: ResourceUsage::default(),
            termination_reason: None,
            steps: Vec::new(),
            outcome_summary: None,
            safety: None,
            questioning: None,
            risk: None,
            checks: Vec::new(),
            escalations: Vec::new(),
            escalated: false,
        }
    }

    fn transition(&mut self, to: ProcessState) -> Result<()> {
        if !self.state.can_transition(to) {
            return Err(NoemaError::InvalidTransition {
                from: self.state.to_string(),
                to: to.to_string(),
            });
        }
        self.state = to;
        Ok(())
    }

    /// `pending → approved`.
    pub fn approve(&mut self) -> Result<()> {
        self.transition(ProcessState::Approved)
    }

    /// `approved → running`; stamps `started_at`.
    pub fn start(&mut self) -> Result<()> {
        self.transition(ProcessState::Running)?;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// `running → completed`; stamps `ended_at`.
    pub fn complete(&mut self, summary: Option<String>) -> Result<()> {
        self.transition(ProcessState::Completed)?;
        self.outcome_summary = summary;
        self.ended_at = Some(Utc::now());
        Ok(())
    }

    /// `running → failed`; reason captured, `ended_at` stamped.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<()> {
        self.transition(ProcessState::Failed)?;
        self.termination_reason = Some(reason.into());
        self.ended_at = Some(Utc::now());
        Ok(())
    }

    /// `{pending|approved|running} → terminated`; reason captured,
    /// `ended_at` stamped.
    pub fn terminate(&mut self, reason: impl Into<String>) -> Result<()> {
        self.transition(ProcessState::Terminated)?;
        self.termination_reason = Some(reason.into());
        self.ended_at = Some(Utc::now());
        Ok(())
    }

    /// Fold new peak usage into the process. Values only ever go up,
    /// and recording is refused once the process is no longer running.
    /// Returns whether anything was recorded.
    pub fn record_usage(&mut self, compute_pct: f64, memory_mb: f64) -> bool {
        if self.state != ProcessState::Running {
            return false;
        }
        self.usage.compute_pct = self.usage.compute_pct.max(compute_pct);
        self.usage.memory_mb = self.usage.memory_mb.max(memory_mb);
        true
    }

    pub fn push_check(
        &mut self,
        stage: crate::gate::CheckStage,
        passed: bool,
        note: impl Into<String>,
    ) {
        self.checks.push(GovernanceCheck {
            at: Utc::now(),
            stage,
            passed,
            note: note.into(),
        });
    }

    /// Elapsed wall-clock seconds since the process started running.
    pub fn elapsed_secs(&self) -> Option<f64> {
        self.started_at
            .map(|t| (Utc::now() - t).num_milliseconds() as f64 / 1000.0)
    }

    /// Fraction of the allocated compute ceiling currently in use.
    pub fn compute_ratio(&self) -> Option<f64> {
        self.allocation
            .as_ref()
            .filter(|a| a.compute_pct > 0.0)
            .map(|a| self.usage.compute_pct / a.compute_pct)
    }

    pub fn snapshot(&self) -> ProcessSnapshot {
        ProcessSnapshot {
            id: self.id,
            agent_id: self.agent_id.clone(),
            process_type: self.process_type,
            state: self.state,
            trigger: self.trigger.clone(),
            created_at: self.created_at,
            started_at: self.started_at,
            ended_at: self.ended_at,
            allocation: self.allocation.clone(),
            usage: self.usage,
            termination_reason: self.termination_reason.clone(),
            steps: self.steps.clone(),
            outcome_summary: self.outcome_summary.clone(),
            risk_band: self.risk.as_ref().map(|r| r.band),
            checks: self.checks.clone(),
            escalations: self.escalations.clone(),
            escalated: self.escalated,
        }
    }
}

/// Read-only view of a process handed back to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessSnapshot {
    pub id: ProcessId,
    pub agent_id: AgentId,
    pub process_type: ProcessType,
    pub state: ProcessState,
    pub trigger: String,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub allocation: Option<ResourceAllocation>,
    pub usage: ResourceUsage,
    pub termination_reason: Option<String>,
    pub steps: Vec<StepRecord>,
    pub outcome_summary: Option<String>,
    pub risk_band: Option<crate::gate::RiskBand>,
    pub checks: Vec<GovernanceCheck>,
    pub escalations: Vec<ConflictEscalation>,
    pub escalated: bool,
}
