//! # noema-core
//!
//! Core types, traits, and primitives for the Noema process governor.
//! This crate defines the shared vocabulary used by every other crate in
//! the workspace: the process model and its state machine, governance
//! records, audit events, and the external interfaces the governor
//! consumes (trust provider, cognitive engines, audit sink).

pub mod engine;
pub mod error;
pub mod event;
pub mod gate;
pub mod process;
pub mod trust;

pub use engine::{CognitiveEngine, EngineInput, EngineOutcome};
pub use error::{NoemaError, Result};
pub use event::{AuditEvent, AuditSink, MemoryAuditSink, NullAuditSink, TracingAuditSink};
pub use gate::{
    CheckStage, ConflictEscalation, GovernanceCheck, QuestioningVerdict, Reflection, RiskBand,
    RiskFactor, RiskVerdict, SafetyFactors, SafetyVerdict,
};
pub use process::{
    AgentId, AutonomousProcess, ProcessId, ProcessRequest, ProcessSnapshot, ProcessState,
    ProcessType, ResourceAllocation, ResourceUsage, StepRecord,
};
pub use trust::{StaticTrustProvider, TrustProvider};
