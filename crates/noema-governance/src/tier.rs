use serde::{Deserialize, Serialize};
use std::fmt;

use noema_config::{GovernanceConfig, TierConfig, TrustBands};
use noema_core::{NoemaError, ProcessType, Result};

/// Four ordered autonomy tiers. Higher trust never yields a more
/// restrictive tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum AutonomyTier {
    Restricted = 0,
    Limited = 1,
    Standard = 2,
    Enhanced = 3,
}

impl AutonomyTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Restricted => "restricted",
            Self::Limited => "limited",
            Self::Standard => "standard",
            Self::Enhanced => "enhanced",
        }
    }
}

impl fmt::Display for AutonomyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The permission envelope of one tier. Built from configuration at
/// startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct TierPolicy {
    pub tier: AutonomyTier,
    pub allowed_types: Vec<ProcessType>,
    pub max_duration_secs: u64,
    pub max_resource_pct: f64,
    pub max_memory_mb: u64,
    pub requires_approval: bool,
    pub can_initiate: bool,
}

impl TierPolicy {
    fn from_config(tier: AutonomyTier, config: &TierConfig) -> Self {
        Self {
            tier,
            allowed_types: config.allowed_types.clone(),
            max_duration_secs: config.max_duration_secs,
            max_resource_pct: config.max_resource_pct,
            max_memory_mb: config.max_memory_mb,
            requires_approval: config.requires_approval,
            can_initiate: config.can_initiate,
        }
    }

    pub fn allows(&self, process_type: ProcessType) -> bool {
        self.allowed_types.contains(&process_type)
    }
}

/// Maps a trust score to an autonomy tier over four half-open bands.
/// Pure: no side effects, and the only failure mode is a score outside
/// `[0, 1]`.
#[derive(Debug, Clone)]
pub struct AutonomyResolver {
    bands: TrustBands,
    policies: [TierPolicy; 4],
}

impl AutonomyResolver {
    pub fn new(config: &GovernanceConfig) -> Self {
        Self {
            bands: config.bands,
            policies: [
                TierPolicy::from_config(AutonomyTier::Restricted, &config.tiers.restricted),
                TierPolicy::from_config(AutonomyTier::Limited, &config.tiers.limited),
                TierPolicy::from_config(AutonomyTier::Standard, &config.tiers.standard),
                TierPolicy::from_config(AutonomyTier::Enhanced, &config.tiers.enhanced),
            ],
        }
    }

    /// Total over `[0, 1]`: every valid score maps to exactly one tier.
    pub fn resolve(&self, trust_score: f64) -> Result<AutonomyTier> {
        if !trust_score.is_finite() || !(0.0..=1.0).contains(&trust_score) {
            return Err(NoemaError::InvalidTrustScore(trust_score));
        }
        let tier = if trust_score >= self.bands.enhanced {
            AutonomyTier::Enhanced
        } else if trust_score >= self.bands.standard {
            AutonomyTier::Standard
        } else if trust_score >= self.bands.limited {
            AutonomyTier::Limited
        } else {
            AutonomyTier::Restricted
        };
        Ok(tier)
    }

    pub fn policy(&self, tier: AutonomyTier) -> &TierPolicy {
        &self.policies[tier as usize]
    }
}
