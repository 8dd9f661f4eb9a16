//! # noema-governance
//!
//! The approval side of the governor: trust-to-autonomy resolution,
//! the four-stage governance pipeline every process request passes
//! before it may consume compute, and the resource budget policy that
//! caps what an accepted process is allowed to use.

pub mod budget;
pub mod pipeline;
pub mod scoring;
pub mod tier;

pub use budget::allocate;
pub use pipeline::{GovernancePipeline, PipelineDecision, PipelineOutcome};
pub use scoring::{ConfiguredScoring, GateScoring};
pub use tier::{AutonomyResolver, AutonomyTier, TierPolicy};
