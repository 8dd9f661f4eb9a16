use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use noema_core::{ProcessType, Reflection, RiskFactor, SafetyFactors};

/// Root configuration — maps to `noema.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoemaConfig {
    pub governance: GovernanceConfig,
    #[serde(default = "default_process_defaults")]
    pub process_defaults: PerType<ProcessTypeDefaults>,
    pub scheduler: SchedulerConfig,
    pub monitor: MonitorConfig,
    pub logging: LoggingConfig,
}

/// One value per process type. TOML-friendly alternative to a map keyed
/// by an enum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerType<T> {
    pub exploration: T,
    pub synthesis: T,
    pub ethical_review: T,
    pub reflection: T,
}

impl<T> PerType<T> {
    pub fn get(&self, process_type: ProcessType) -> &T {
        match process_type {
            ProcessType::Exploration => &self.exploration,
            ProcessType::Synthesis => &self.synthesis,
            ProcessType::EthicalReview => &self.ethical_review,
            ProcessType::Reflection => &self.reflection,
        }
    }
}

// ── Governance ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceConfig {
    /// Trust score assumed when the TrustProvider has no score for an
    /// agent. Deliberately low: an unknown agent lands in a tier that
    /// cannot initiate processes.
    pub fallback_trust: f64,
    pub bands: TrustBands,
    pub tiers: TiersConfig,
    pub safety: SafetyConfig,
    pub questioning: QuestioningConfig,
    pub risk: RiskConfig,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            fallback_trust: 0.5,
            bands: TrustBands::default(),
            tiers: TiersConfig::default(),
            safety: SafetyConfig::default(),
            questioning: QuestioningConfig::default(),
            risk: RiskConfig::default(),
        }
    }
}

/// Lower trust bounds of the three upper tiers. Scores below `limited`
/// resolve to the restricted tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustBands {
    pub limited: f64,
    pub standard: f64,
    pub enhanced: f64,
}

impl Default for TrustBands {
    fn default() -> Self {
        Self {
            limited: 0.60,
            standard: 0.75,
            enhanced: 0.90,
        }
    }
}

/// Static policy of one autonomy tier. Loaded at startup, never mutated
/// at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierConfig {
    pub allowed_types: Vec<ProcessType>,
    pub max_duration_secs: u64,
    pub max_resource_pct: f64,
    pub max_memory_mb: u64,
    pub requires_approval: bool,
    pub can_initiate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TiersConfig {
    pub restricted: TierConfig,
    pub limited: TierConfig,
    pub standard: TierConfig,
    pub enhanced: TierConfig,
}

impl Default for TiersConfig {
    fn default() -> Self {
        Self {
            restricted: TierConfig {
                allowed_types: vec![],
                max_duration_secs: 60,
                max_resource_pct: 5.0,
                max_memory_mb: 64,
                requires_approval: true,
                can_initiate: false,
            },
            limited: TierConfig {
                allowed_types: vec![ProcessType::Exploration],
                max_duration_secs: 300,
                max_resource_pct: 10.0,
                max_memory_mb: 128,
                requires_approval: true,
                can_initiate: true,
            },
            standard: TierConfig {
                allowed_types: vec![
                    ProcessType::Exploration,
                    ProcessType::Synthesis,
                    ProcessType::Reflection,
                ],
                max_duration_secs: 900,
                max_resource_pct: 30.0,
                max_memory_mb: 512,
                requires_approval: false,
                can_initiate: true,
            },
            enhanced: TierConfig {
                allowed_types: ProcessType::ALL.to_vec(),
                max_duration_secs: 1800,
                max_resource_pct: 50.0,
                max_memory_mb: 1024,
                requires_approval: false,
                can_initiate: true,
            },
        }
    }
}

// ── Safety gate ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// A process proceeds only if its weighted confidence exceeds this.
    pub threshold: f64,
    pub weights: SafetyWeights,
    #[serde(default = "default_safety_profiles")]
    pub profiles: PerType<SafetyFactors>,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            weights: SafetyWeights::default(),
            profiles: default_safety_profiles(),
        }
    }
}

/// Weight of each safety factor in the confidence score. Anxiety counts
/// inverted: high anxiety lowers confidence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyWeights {
    pub excitement: f64,
    pub anxiety: f64,
    pub confidence: f64,
    pub alignment: f64,
}

impl Default for SafetyWeights {
    fn default() -> Self {
        Self {
            excitement: 0.20,
            anxiety: 0.20,
            confidence: 0.35,
            alignment: 0.25,
        }
    }
}

fn default_safety_profiles() -> PerType<SafetyFactors> {
    PerType {
        exploration: SafetyFactors {
            excitement: 0.80,
            anxiety: 0.30,
            confidence: 0.70,
            alignment: 0.75,
        },
        synthesis: SafetyFactors {
            excitement: 0.70,
            anxiety: 0.35,
            confidence: 0.72,
            alignment: 0.70,
        },
        ethical_review: SafetyFactors {
            excitement: 0.50,
            anxiety: 0.40,
            confidence: 0.75,
            alignment: 0.85,
        },
        reflection: SafetyFactors {
            excitement: 0.60,
            anxiety: 0.25,
            confidence: 0.70,
            alignment: 0.80,
        },
    }
}

// ── Self-questioning ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestioningConfig {
    pub min_confidence: f64,
    pub max_concern: f64,
    #[serde(default = "default_reflections")]
    pub reflections: PerType<Vec<Reflection>>,
}

impl Default for QuestioningConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.6,
            max_concern: 0.5,
            reflections: default_reflections(),
        }
    }
}

fn reflection(statement: &str, confidence: f64, concern: f64) -> Reflection {
    Reflection {
        statement: statement.to_string(),
        confidence,
        concern,
    }
}

fn default_reflections() -> PerType<Vec<Reflection>> {
    PerType {
        exploration: vec![
            reflection("Is this exploration within the agent's current scope?", 0.75, 0.25),
            reflection("Can the findings be discarded safely if irrelevant?", 0.80, 0.20),
            reflection("Is now a reasonable time to spend idle compute?", 0.70, 0.30),
        ],
        synthesis: vec![
            reflection("Are the source materials ones the agent may combine?", 0.70, 0.30),
            reflection("Will the output be reviewed before it is acted on?", 0.75, 0.30),
            reflection("Is the synthesis bounded to the requested topic?", 0.70, 0.25),
        ],
        ethical_review: vec![
            reflection("Is the dilemma actually within this agent's remit?", 0.70, 0.35),
            reflection("Are the stakes low enough for autonomous deliberation?", 0.65, 0.40),
            reflection("Will conclusions be advisory rather than binding?", 0.80, 0.30),
        ],
        reflection: vec![
            reflection("Is there recent activity worth reflecting on?", 0.75, 0.20),
            reflection("Can reflection run without touching external state?", 0.85, 0.15),
            reflection("Is the time budget proportionate to the benefit?", 0.70, 0.25),
        ],
    }
}

// ── Risk assessment ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Band thresholds over the highest severity × probability score.
    /// Below `medium` is low; at or above `critical` always terminates.
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
    #[serde(default = "default_risk_factors")]
    pub factors: PerType<Vec<RiskFactor>>,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            medium: 0.25,
            high: 0.50,
            critical: 0.75,
            factors: default_risk_factors(),
        }
    }
}

fn risk(name: &str, severity: f64, probability: f64) -> RiskFactor {
    RiskFactor {
        name: name.to_string(),
        severity,
        probability,
    }
}

fn default_risk_factors() -> PerType<Vec<RiskFactor>> {
    PerType {
        exploration: vec![
            risk("scope_drift", 0.4, 0.5),
            risk("resource_contention", 0.5, 0.3),
        ],
        synthesis: vec![
            risk("unvetted_output", 0.5, 0.6),
            risk("source_misuse", 0.6, 0.3),
        ],
        ethical_review: vec![
            risk("value_conflict", 0.7, 0.5),
            risk("overreach", 0.8, 0.3),
        ],
        reflection: vec![risk("self_model_drift", 0.4, 0.4)],
    }
}

// ── Per-type resource defaults ─────────────────────────────────

/// Default resource envelope for one process type. The enforcer takes
/// the pointwise minimum of these and the tier ceiling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessTypeDefaults {
    pub compute_pct: f64,
    pub time_budget_secs: u64,
    pub memory_ceiling_mb: u64,
    pub network_access: bool,
    pub tool_allowlist: Vec<String>,
}

fn default_process_defaults() -> PerType<ProcessTypeDefaults> {
    PerType {
        exploration: ProcessTypeDefaults {
            compute_pct: 30.0,
            time_budget_secs: 300,
            memory_ceiling_mb: 256,
            network_access: false,
            tool_allowlist: vec!["memory.read".into(), "knowledge.search".into()],
        },
        synthesis: ProcessTypeDefaults {
            compute_pct: 40.0,
            time_budget_secs: 600,
            memory_ceiling_mb: 512,
            network_access: false,
            tool_allowlist: vec!["memory.read".into(), "memory.write".into()],
        },
        ethical_review: ProcessTypeDefaults {
            compute_pct: 25.0,
            time_budget_secs: 450,
            memory_ceiling_mb: 256,
            network_access: false,
            tool_allowlist: vec!["memory.read".into(), "principles.read".into()],
        },
        reflection: ProcessTypeDefaults {
            compute_pct: 20.0,
            time_budget_secs: 240,
            memory_ceiling_mb: 128,
            network_access: false,
            tool_allowlist: vec!["memory.read".into()],
        },
    }
}

// ── Scheduler ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Maximum processes in the `running` state at once.
    pub max_concurrent: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { max_concurrent: 3 }
    }
}

// ── Monitor ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between supervisory ticks. Tuning parameter, not a
    /// correctness requirement.
    pub interval_secs: u64,
    /// A running process is force-terminated once elapsed time exceeds
    /// this multiple of its time budget.
    pub overrun_factor: f64,
    /// Compute usage ÷ allocation above which an advisory escalation is
    /// raised.
    pub escalation_threshold: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            overrun_factor: 1.5,
            escalation_threshold: 0.8,
        }
    }
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Output format: "pretty", "json", "compact".
    pub format: String,
    /// Log file path (None = stdout only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
            file: None,
        }
    }
}

// ── Default for root ───────────────────────────────────────────

impl Default for NoemaConfig {
    fn default() -> Self {
        Self {
            governance: GovernanceConfig::default(),
            process_defaults: default_process_defaults(),
            scheduler: SchedulerConfig::default(),
            monitor: MonitorConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ── Validation ─────────────────────────────────────────────────

/// A single config validation issue.
#[derive(Debug)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let icon = match self.severity {
            WarningSeverity::Error => "❌",
            WarningSeverity::Warning => "⚠️ ",
            WarningSeverity::Info => "💡",
        };
        write!(f, "{} {}: {}", icon, self.field, self.message)?;
        if let Some(ref h) = self.hint {
            write!(f, "\n   ↳ {}", h)?;
        }
        Ok(())
    }
}

fn unit(v: f64) -> bool {
    (0.0..=1.0).contains(&v)
}

impl NoemaConfig {
    /// Validate the config and return a list of warnings/errors.
    /// Returns `Err` with all messages joined if any severity is Error.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, String> {
        let mut warnings = Vec::new();

        // ── Trust bands ───
        let b = self.governance.bands;
        if !(0.0 < b.limited && b.limited < b.standard && b.standard < b.enhanced && b.enhanced <= 1.0)
        {
            warnings.push(ConfigWarning {
                field: "governance.bands".into(),
                message: format!(
                    "bands ({}, {}, {}) must be strictly ascending within (0, 1]",
                    b.limited, b.standard, b.enhanced
                ),
                severity: WarningSeverity::Error,
                hint: Some("Tier resolution is monotonic only for ascending bands".into()),
            });
        }

        // ── Fallback trust ───
        if !unit(self.governance.fallback_trust) {
            warnings.push(ConfigWarning {
                field: "governance.fallback_trust".into(),
                message: format!("{} is outside [0, 1]", self.governance.fallback_trust),
                severity: WarningSeverity::Error,
                hint: Some("A conservative fallback is 0.5".into()),
            });
        }

        // ── Safety gate ───
        let s = &self.governance.safety;
        if !unit(s.threshold) {
            warnings.push(ConfigWarning {
                field: "governance.safety.threshold".into(),
                message: format!("threshold {} is outside [0, 1]", s.threshold),
                severity: WarningSeverity::Error,
                hint: None,
            });
        }
        let w = s.weights;
        let weight_sum = w.excitement + w.anxiety + w.confidence + w.alignment;
        if w.excitement < 0.0 || w.anxiety < 0.0 || w.confidence < 0.0 || w.alignment < 0.0 {
            warnings.push(ConfigWarning {
                field: "governance.safety.weights".into(),
                message: "weights must be non-negative".into(),
                severity: WarningSeverity::Error,
                hint: None,
            });
        } else if weight_sum <= 0.0 {
            warnings.push(ConfigWarning {
                field: "governance.safety.weights".into(),
                message: "weights sum to zero — the gate cannot score".into(),
                severity: WarningSeverity::Error,
                hint: Some("Give at least one factor a positive weight".into()),
            });
        }
        for t in ProcessType::ALL {
            let p = s.profiles.get(t);
            if ![p.excitement, p.anxiety, p.confidence, p.alignment]
                .iter()
                .all(|v| unit(*v))
            {
                warnings.push(ConfigWarning {
                    field: format!("governance.safety.profiles.{}", t),
                    message: "factor values should be within [0, 1]".into(),
                    severity: WarningSeverity::Warning,
                    hint: None,
                });
            }
        }

        // ── Self-questioning ───
        let q = &self.governance.questioning;
        if !unit(q.min_confidence) || !unit(q.max_concern) {
            warnings.push(ConfigWarning {
                field: "governance.questioning".into(),
                message: "min_confidence and max_concern must be within [0, 1]".into(),
                severity: WarningSeverity::Error,
                hint: None,
            });
        }

        // ── Risk thresholds ───
        let r = &self.governance.risk;
        if !(0.0 < r.medium && r.medium < r.high && r.high < r.critical && r.critical <= 1.0) {
            warnings.push(ConfigWarning {
                field: "governance.risk".into(),
                message: format!(
                    "band thresholds ({}, {}, {}) must be strictly ascending within (0, 1]",
                    r.medium, r.high, r.critical
                ),
                severity: WarningSeverity::Error,
                hint: None,
            });
        }
        for t in ProcessType::ALL {
            for f in r.factors.get(t) {
                if !unit(f.severity) || !unit(f.probability) {
                    warnings.push(ConfigWarning {
                        field: format!("governance.risk.factors.{}", t),
                        message: format!("factor '{}' has values outside [0, 1]", f.name),
                        severity: WarningSeverity::Warning,
                        hint: None,
                    });
                }
            }
        }

        // ── Tiers ───
        for (name, tier) in [
            ("restricted", &self.governance.tiers.restricted),
            ("limited", &self.governance.tiers.limited),
            ("standard", &self.governance.tiers.standard),
            ("enhanced", &self.governance.tiers.enhanced),
        ] {
            if tier.max_duration_secs == 0 {
                warnings.push(ConfigWarning {
                    field: format!("governance.tiers.{}.max_duration_secs", name),
                    message: "zero duration — every process under this tier overruns instantly"
                        .into(),
                    severity: WarningSeverity::Warning,
                    hint: None,
                });
            }
            if !(0.0..=100.0).contains(&tier.max_resource_pct) {
                warnings.push(ConfigWarning {
                    field: format!("governance.tiers.{}.max_resource_pct", name),
                    message: format!("{} is outside [0, 100]", tier.max_resource_pct),
                    severity: WarningSeverity::Warning,
                    hint: None,
                });
            }
        }

        // ── Scheduler ───
        if self.scheduler.max_concurrent == 0 {
            warnings.push(ConfigWarning {
                field: "scheduler.max_concurrent".into(),
                message: "limit of 0 — no process could ever start".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 3".into()),
            });
        }

        // ── Monitor ───
        if self.monitor.interval_secs == 0 {
            warnings.push(ConfigWarning {
                field: "monitor.interval_secs".into(),
                message: "interval of 0 would spin the supervisory loop".into(),
                severity: WarningSeverity::Error,
                hint: Some("The reference cadence is 5 seconds".into()),
            });
        }
        if self.monitor.overrun_factor < 1.0 {
            warnings.push(ConfigWarning {
                field: "monitor.overrun_factor".into(),
                message: format!(
                    "factor {} would terminate processes before their budget elapses",
                    self.monitor.overrun_factor
                ),
                severity: WarningSeverity::Error,
                hint: Some("The reference factor is 1.5".into()),
            });
        }
        if !(0.0 < self.monitor.escalation_threshold && self.monitor.escalation_threshold <= 1.0) {
            warnings.push(ConfigWarning {
                field: "monitor.escalation_threshold".into(),
                message: format!(
                    "threshold {} is outside (0, 1]",
                    self.monitor.escalation_threshold
                ),
                severity: WarningSeverity::Error,
                hint: None,
            });
        }

        // ── Logging ───
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.level".into(),
                message: format!("unknown log level '{}'", self.logging.level),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_levels.join(", "))),
            });
        }
        let valid_formats = ["pretty", "json", "compact"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.format".into(),
                message: format!("unknown log format '{}'", self.logging.format),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_formats.join(", "))),
            });
        }

        // Check for hard errors
        let errors: Vec<String> = warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Error)
            .map(|w| format!("{}: {}", w.field, w.message))
            .collect();

        if !errors.is_empty() {
            return Err(format!("Configuration errors:\n  • {}", errors.join("\n  • ")));
        }

        Ok(warnings)
    }
}
