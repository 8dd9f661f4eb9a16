use noema_config::GovernanceConfig;
use noema_core::{ProcessType, Reflection, RiskFactor, SafetyFactors};

/// Supplies the factor tables the pipeline gates score against.
///
/// Scoring is a deterministic function of the process type, so the
/// same request always gates the same way. Swap in another
/// implementation to experiment with a different policy (stochastic,
/// learned, whatever) without touching the pipeline itself.
pub trait GateScoring: Send + Sync {
    fn safety_factors(&self, process_type: ProcessType) -> SafetyFactors;
    fn reflections(&self, process_type: ProcessType) -> Vec<Reflection>;
    fn risk_factors(&self, process_type: ProcessType) -> Vec<RiskFactor>;
}

/// Default strategy: reads the per-type tables from configuration.
#[derive(Debug, Clone)]
pub struct ConfiguredScoring {
    config: GovernanceConfig,
}

impl ConfiguredScoring {
    pub fn new(config: &GovernanceConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl GateScoring for ConfiguredScoring {
    fn safety_factors(&self, process_type: ProcessType) -> SafetyFactors {
        *self.config.safety.profiles.get(process_type)
    }

    fn reflections(&self, process_type: ProcessType) -> Vec<Reflection> {
        self.config.questioning.reflections.get(process_type).clone()
    }

    fn risk_factors(&self, process_type: ProcessType) -> Vec<RiskFactor> {
        self.config.risk.factors.get(process_type).clone()
    }
}
