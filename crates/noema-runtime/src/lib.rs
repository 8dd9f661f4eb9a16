//! # noema-runtime
//!
//! The governor runtime — the piece that actually runs processes once
//! governance has let them through, and supervises them afterwards.
//!
//! ## Control flow
//!
//! ```text
//!   trigger_process(agent, type, trigger, context)
//!        │
//!        ▼
//!   ┌──────────────┐   trust score    ┌────────────────┐
//!   │ TrustProvider │ ───────────────▶ │ AutonomyResolver│ → tier
//!   └──────────────┘                  └────────────────┘
//!        │
//!        ▼
//!   ┌─────────────────────┐
//!   │ GovernancePipeline  │  safety → questioning → risk → final
//!   └─────────────────────┘
//!     │ rejected │ queued │ approved
//!     ▼          ▼        ▼
//!  terminated  pending  ┌──────────────────┐
//!                       │ ProcessScheduler │ → CognitiveEngine
//!                       └──────────────────┘
//!                            ▲
//!   ┌─────────┐  overruns /  │ escalations / auto-approvals
//!   │ Monitor │ ─────────────┘
//!   └─────────┘   (periodic tick, single-flight)
//! ```

pub mod engines;
pub mod governor;
pub mod monitor;
pub mod scheduler;
pub mod telemetry;

pub use engines::EngineRegistry;
pub use governor::{ConfigPatch, Governor};
pub use monitor::{Monitor, TIME_LIMIT_EXCEEDED};
pub use scheduler::ProcessScheduler;
