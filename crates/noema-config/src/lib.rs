//! # noema-config
//!
//! Configuration system for the Noema governor. Reads from `noema.toml`
//! and environment variables — in that precedence order. Every tunable
//! the governance pipeline, scheduler, and monitor consult lives here:
//! trust bands, tier policies, gate factor tables, per-type resource
//! defaults, and monitor cadence.

pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{
    ConfigWarning, GovernanceConfig, LoggingConfig, MonitorConfig, NoemaConfig, PerType,
    ProcessTypeDefaults, QuestioningConfig, RiskConfig, SafetyConfig, SafetyWeights,
    SchedulerConfig, TierConfig, TiersConfig, TrustBands, WarningSeverity,
};
