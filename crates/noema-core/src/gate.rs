use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Emotional-safety factor profile for one process type, each in [0, 1].
/// Deterministic configuration, not a runtime measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafetyFactors {
    pub excitement: f64,
    pub anxiety: f64,
    pub confidence: f64,
    pub alignment: f64,
}

/// Outcome of the safety gate (pipeline stage 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyVerdict {
    /// Weighted confidence in [0, 1].
    pub confidence: f64,
    pub factors: SafetyFactors,
    pub proceed: bool,
}

/// One self-questioning rationale statement with its scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reflection {
    pub statement: String,
    pub confidence: f64,
    pub concern: f64,
}

/// Outcome of the self-questioning stage (pipeline stage 2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestioningVerdict {
    pub rationale: Vec<String>,
    pub mean_confidence: f64,
    pub mean_concern: f64,
    pub proceed: bool,
}

/// A named risk factor: severity × probability, both in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFactor {
    pub name: String,
    pub severity: f64,
    pub probability: f64,
}

impl RiskFactor {
    pub fn score(&self) -> f64 {
        self.severity * self.probability
    }
}

/// Overall risk band. `Critical` always terminates a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

/// Outcome of the risk-assessment stage (pipeline stage 3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskVerdict {
    pub factors: Vec<RiskFactor>,
    /// Highest factor score (severity × probability).
    pub score: f64,
    pub band: RiskBand,
    pub proceed: bool,
}

/// Which governance step produced a check record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStage {
    SafetyGate,
    SelfQuestioning,
    RiskAssessment,
    FinalGate,
    Monitor,
}

impl fmt::Display for CheckStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::SafetyGate => "safety_gate",
            Self::SelfQuestioning => "self_questioning",
            Self::RiskAssessment => "risk_assessment",
            Self::FinalGate => "final_gate",
            Self::Monitor => "monitor",
        };
        write!(f, "{s}")
    }
}

/// Append-only record of one governance decision on a process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceCheck {
    pub at: DateTime<Utc>,
    pub stage: CheckStage,
    pub passed: bool,
    pub note: String,
}

/// Append-only advisory raised when usage nears its allocation.
/// Never retracted, never terminates the process by itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictEscalation {
    pub at: DateTime<Utc>,
    /// usage ÷ allocation at the time of the escalation.
    pub usage_ratio: f64,
    pub note: String,
}
