use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use noema_config::NoemaConfig;
use noema_core::{
    AuditEvent, AuditSink, AutonomousProcess, CognitiveEngine, NoemaError, ProcessId,
    ProcessRequest, ProcessSnapshot, ProcessType, Result, TrustProvider,
};
use noema_governance::{
    AutonomyResolver, GateScoring, GovernancePipeline, PipelineDecision, allocate,
};

use crate::engines::EngineRegistry;
use crate::monitor::Monitor;
use crate::scheduler::ProcessScheduler;

/// The public face of the governor. One explicit instance owns the
/// resolver, pipeline, scheduler, and monitor, constructed once and
/// passed by reference wherever it is needed.
pub struct Governor {
    config: Arc<RwLock<NoemaConfig>>,
    trust: Arc<dyn TrustProvider>,
    audit: Arc<dyn AuditSink>,
    resolver: AutonomyResolver,
    pipeline: GovernancePipeline,
    engines: Arc<EngineRegistry>,
    scheduler: ProcessScheduler,
    monitor: Arc<Monitor>,
}

impl Governor {
    pub fn new(
        config: NoemaConfig,
        trust: Arc<dyn TrustProvider>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let resolver = AutonomyResolver::new(&config.governance);
        let pipeline = GovernancePipeline::new(&config.governance, Arc::clone(&audit));
        Self::assemble(config, trust, audit, resolver, pipeline)
    }

    /// Build with a custom gate scoring strategy instead of the
    /// configuration-driven default.
    pub fn with_scoring(
        config: NoemaConfig,
        trust: Arc<dyn TrustProvider>,
        audit: Arc<dyn AuditSink>,
        scoring: Arc<dyn GateScoring>,
    ) -> Self {
        let resolver = AutonomyResolver::new(&config.governance);
        let pipeline =
            GovernancePipeline::with_scoring(&config.governance, scoring, Arc::clone(&audit));
        Self::assemble(config, trust, audit, resolver, pipeline)
    }

    fn assemble(
        config: NoemaConfig,
        trust: Arc<dyn TrustProvider>,
        audit: Arc<dyn AuditSink>,
        resolver: AutonomyResolver,
        pipeline: GovernancePipeline,
    ) -> Self {
        let config = Arc::new(RwLock::new(config));
        let engines = Arc::new(EngineRegistry::new());
        let scheduler = ProcessScheduler::new(
            Arc::clone(&config),
            Arc::clone(&engines),
            Arc::clone(&audit),
        );
        let monitor = Arc::new(Monitor::new(scheduler.clone(), Arc::clone(&config)));
        Self {
            config,
            trust,
            audit,
            resolver,
            pipeline,
            engines,
            scheduler,
            monitor,
        }
    }

    /// Register the engine for its process type.
    pub fn register_engine(&self, engine: Arc<dyn CognitiveEngine>) {
        self.engines.register(engine);
    }

    /// Request an autonomous process. The request passes trust
    /// resolution, the tier allow-list, and the governance pipeline
    /// before it may touch a concurrency slot.
    ///
    /// A pipeline rejection is a normal outcome: the returned snapshot
    /// simply has state `terminated` with the reason populated. Errors
    /// are reserved for rejected submissions: disallowed type,
    /// initiation not permitted, capacity exhausted.
    pub async fn trigger_process(
        &self,
        agent_id: &str,
        process_type: ProcessType,
        trigger: &str,
        context: Value,
    ) -> Result<ProcessSnapshot> {
        let trust_score = match self.trust.trust_score(agent_id).await {
            Ok(score) => score,
            Err(NoemaError::TrustUnavailable(_)) => {
                let fallback = self.config.read().governance.fallback_trust;
                warn!(agent_id, fallback, "trust score unavailable — using fallback");
                fallback
            }
            Err(e) => return Err(e),
        };
        let tier = self.resolver.resolve(trust_score)?;
        self.audit.record(AuditEvent::TierResolved {
            agent_id: agent_id.to_string(),
            trust_score,
            tier: tier.to_string(),
        });

        let policy = self.resolver.policy(tier);
        if !policy.can_initiate {
            return Err(NoemaError::InitiationNotAllowed {
                tier: tier.to_string(),
            });
        }
        // Checked before any pipeline stage runs.
        if !policy.allows(process_type) {
            return Err(NoemaError::ProcessTypeNotAllowed {
                tier: tier.to_string(),
                process_type: process_type.to_string(),
            });
        }

        let request = ProcessRequest {
            agent_id: agent_id.to_string(),
            process_type,
            trigger: trigger.to_string(),
            context,
        };
        let outcome = self.pipeline.evaluate(request, policy)?;
        let mut process = outcome.process;
        match outcome.decision {
            PipelineDecision::Rejected => Ok(self.scheduler.adopt_terminal(process)),
            decision => {
                let defaults = self.config.read().process_defaults.get(process_type).clone();
                process.allocation = Some(allocate(policy, &defaults));
                match decision {
                    PipelineDecision::Approved => self.scheduler.submit(process),
                    _ => Ok(self.scheduler.enqueue_pending(process)),
                }
            }
        }
    }

    /// Snapshots of the agent's non-terminal processes.
    pub fn active_processes(&self, agent_id: &str) -> Vec<ProcessSnapshot> {
        self.scheduler.active(agent_id)
    }

    pub fn process(&self, id: ProcessId) -> Option<ProcessSnapshot> {
        self.scheduler.snapshot(id)
    }

    /// Remove and return a terminal process.
    pub fn reap(&self, id: ProcessId) -> Option<AutonomousProcess> {
        self.scheduler.reap(id)
    }

    /// Report live usage for a running process. Returns whether the
    /// figures were recorded (false once the process left `running`).
    pub fn record_usage(&self, id: ProcessId, compute_pct: f64, memory_mb: f64) -> Result<bool> {
        self.scheduler.record_usage(id, compute_pct, memory_mb)
    }

    pub fn cancel(&self, id: ProcessId, reason: &str) -> Result<ProcessSnapshot> {
        self.scheduler.cancel(id, reason)
    }

    /// Emergency stop: terminate every non-terminal process the agent
    /// owns. Returns how many were stopped.
    pub fn cancel_all(&self, agent_id: &str) -> usize {
        self.scheduler.cancel_all(agent_id, "emergency stop")
    }

    pub fn config(&self) -> NoemaConfig {
        self.config.read().clone()
    }

    /// Apply a partial update to the runtime tunables. Tier policies
    /// and gate tables are fixed at startup and not patchable.
    pub fn update_config(&self, patch: ConfigPatch) {
        let mut config = self.config.write();
        if let Some(limit) = patch.max_concurrent {
            if limit == 0 {
                warn!("ignoring max_concurrent of 0");
            } else {
                config.scheduler.max_concurrent = limit;
            }
        }
        if let Some(secs) = patch.monitor_interval_secs {
            if secs == 0 {
                warn!("ignoring monitor interval of 0");
            } else {
                config.monitor.interval_secs = secs;
            }
        }
        if let Some(factor) = patch.overrun_factor {
            if factor < 1.0 {
                warn!(factor, "ignoring overrun factor below 1.0");
            } else {
                config.monitor.overrun_factor = factor;
            }
        }
        if let Some(threshold) = patch.escalation_threshold {
            if !(0.0..=1.0).contains(&threshold) || threshold == 0.0 {
                warn!(threshold, "ignoring escalation threshold outside (0, 1]");
            } else {
                config.monitor.escalation_threshold = threshold;
            }
        }
        if let Some(trust) = patch.fallback_trust {
            if !(0.0..=1.0).contains(&trust) {
                warn!(trust, "ignoring fallback trust outside [0, 1]");
            } else {
                config.governance.fallback_trust = trust;
            }
        }
        if let Some(level) = patch.log_level {
            config.logging.level = level;
        }
        info!("runtime configuration updated");
    }

    pub fn monitor(&self) -> Arc<Monitor> {
        Arc::clone(&self.monitor)
    }

    /// Spawn the supervisory loop as a background task.
    pub fn spawn_monitor(&self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(Arc::clone(&self.monitor).run())
    }
}

/// Partial update for the runtime tunables. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigPatch {
    pub max_concurrent: Option<usize>,
    pub monitor_interval_secs: Option<u64>,
    pub overrun_factor: Option<f64>,
    pub escalation_threshold: Option<f64>,
    pub fallback_trust: Option<f64>,
    pub log_level: Option<String>,
}
