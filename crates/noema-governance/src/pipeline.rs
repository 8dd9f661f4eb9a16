use std::sync::Arc;
use tracing::info;

use noema_config::{GovernanceConfig, SafetyWeights};
use noema_core::{
    AuditEvent, AuditSink, AutonomousProcess, CheckStage, ProcessRequest, QuestioningVerdict,
    Result, RiskBand, RiskVerdict, SafetyVerdict,
};

use crate::scoring::{ConfiguredScoring, GateScoring};
use crate::tier::TierPolicy;

/// What the pipeline decided for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineDecision {
    /// All gates passed and the tier needs no approval; hand straight
    /// to the scheduler.
    Approved,
    /// All gates passed but the tier requires approval; the process is
    /// parked `pending` for the monitor (or a human) to release.
    Queued,
    /// A gate declined. The process is `terminated` with a reason; this
    /// is a normal outcome, not an error.
    Rejected,
}

pub struct PipelineOutcome {
    pub process: AutonomousProcess,
    pub decision: PipelineDecision,
}

/// The sequential approval pipeline. Stages run strictly in order and
/// each may short-circuit the rest; only infrastructure anomalies
/// surface as errors.
pub struct GovernancePipeline {
    safety_threshold: f64,
    weights: SafetyWeights,
    min_confidence: f64,
    max_concern: f64,
    medium: f64,
    high: f64,
    critical: f64,
    scoring: Arc<dyn GateScoring>,
    audit: Arc<dyn AuditSink>,
}

impl GovernancePipeline {
    pub fn new(config: &GovernanceConfig, audit: Arc<dyn AuditSink>) -> Self {
        Self::with_scoring(config, Arc::new(ConfiguredScoring::new(config)), audit)
    }

    pub fn with_scoring(
        config: &GovernanceConfig,
        scoring: Arc<dyn GateScoring>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            safety_threshold: config.safety.threshold,
            weights: config.safety.weights,
            min_confidence: config.questioning.min_confidence,
            max_concern: config.questioning.max_concern,
            medium: config.risk.medium,
            high: config.risk.high,
            critical: config.risk.critical,
            scoring,
            audit,
        }
    }

    /// Run the four gates against a request under the given tier
    /// policy. Returns the process skeleton together with the decision.
    pub fn evaluate(
        &self,
        request: ProcessRequest,
        policy: &TierPolicy,
    ) -> Result<PipelineOutcome> {
        let mut process = AutonomousProcess::from_request(request);
        self.audit.record(AuditEvent::ProcessRequested {
            process_id: process.id,
            agent_id: process.agent_id.clone(),
            process_type: process.process_type,
            trigger: process.trigger.clone(),
        });

        // Stage 1: safety gate
        let safety = self.safety_gate(&process);
        let note = format!(
            "confidence {:.2} vs threshold {:.2}",
            safety.confidence, self.safety_threshold
        );
        process.push_check(CheckStage::SafetyGate, safety.proceed, &note);
        let proceed = safety.proceed;
        process.safety = Some(safety);
        if !proceed {
            let reason = format!("safety gate declined: {note}");
            return self.reject(process, CheckStage::SafetyGate, reason);
        }
        self.audit.record(AuditEvent::GatePassed {
            process_id: process.id,
            stage: CheckStage::SafetyGate,
            note,
        });

        // Stage 2: self-questioning
        let questioning = self.self_questioning(&process);
        let note = format!(
            "mean confidence {:.2}, mean concern {:.2}",
            questioning.mean_confidence, questioning.mean_concern
        );
        process.push_check(CheckStage::SelfQuestioning, questioning.proceed, &note);
        let proceed = questioning.proceed;
        process.questioning = Some(questioning);
        if !proceed {
            let reason = format!("self-questioning declined: {note}");
            return self.reject(process, CheckStage::SelfQuestioning, reason);
        }
        self.audit.record(AuditEvent::GatePassed {
            process_id: process.id,
            stage: CheckStage::SelfQuestioning,
            note,
        });

        // Stage 3: risk assessment. Critical terminates regardless of
        // everything the earlier stages concluded.
        let risk = self.assess_risk(&process);
        let note = format!("risk {:.2} -> {}", risk.score, risk.band);
        process.push_check(CheckStage::RiskAssessment, risk.proceed, &note);
        let proceed = risk.proceed;
        process.risk = Some(risk);
        if !proceed {
            let reason = format!("risk assessment returned critical ({note})");
            return self.reject(process, CheckStage::RiskAssessment, reason);
        }
        self.audit.record(AuditEvent::GatePassed {
            process_id: process.id,
            stage: CheckStage::RiskAssessment,
            note,
        });

        // Stage 4: final gate
        if policy.requires_approval {
            process.push_check(
                CheckStage::FinalGate,
                true,
                format!("tier '{}' requires approval — queued", policy.tier),
            );
            self.audit.record(AuditEvent::ProcessQueued {
                process_id: process.id,
            });
            info!(
                process_id = %process.id,
                process_type = %process.process_type,
                tier = %policy.tier,
                "process queued for approval"
            );
            return Ok(PipelineOutcome {
                process,
                decision: PipelineDecision::Queued,
            });
        }

        process.approve()?;
        process.push_check(CheckStage::FinalGate, true, "approved");
        self.audit.record(AuditEvent::ProcessApproved {
            process_id: process.id,
            auto: false,
        });
        info!(
            process_id = %process.id,
            process_type = %process.process_type,
            tier = %policy.tier,
            "process approved"
        );
        Ok(PipelineOutcome {
            process,
            decision: PipelineDecision::Approved,
        })
    }

    fn reject(
        &self,
        mut process: AutonomousProcess,
        stage: CheckStage,
        reason: String,
    ) -> Result<PipelineOutcome> {
        process.terminate(&reason)?;
        self.audit.record(AuditEvent::GateRejected {
            process_id: process.id,
            stage,
            reason: reason.clone(),
        });
        self.audit.record(AuditEvent::ProcessTerminated {
            process_id: process.id,
            reason: reason.clone(),
        });
        info!(
            process_id = %process.id,
            process_type = %process.process_type,
            stage = %stage,
            reason = %reason,
            "pipeline rejected process"
        );
        Ok(PipelineOutcome {
            process,
            decision: PipelineDecision::Rejected,
        })
    }

    /// Weighted confidence over the type's factor profile, clamped to
    /// [0, 1]. Anxiety counts inverted. Deterministic for a given type.
    fn safety_gate(&self, process: &AutonomousProcess) -> SafetyVerdict {
        let factors = self.scoring.safety_factors(process.process_type);
        let w = self.weights;
        let sum = w.excitement + w.anxiety + w.confidence + w.alignment;
        let confidence = if sum > 0.0 {
            ((w.excitement * factors.excitement
                + w.confidence * factors.confidence
                + w.alignment * factors.alignment
                + w.anxiety * (1.0 - factors.anxiety))
                / sum)
                .clamp(0.0, 1.0)
        } else {
            0.0
        };
        SafetyVerdict {
            confidence,
            factors,
            proceed: confidence > self.safety_threshold,
        }
    }

    fn self_questioning(&self, process: &AutonomousProcess) -> QuestioningVerdict {
        let reflections = self.scoring.reflections(process.process_type);
        let (mean_confidence, mean_concern) = if reflections.is_empty() {
            // Nothing to question: no rationale, no concerns raised.
            (1.0, 0.0)
        } else {
            let n = reflections.len() as f64;
            (
                reflections.iter().map(|r| r.confidence).sum::<f64>() / n,
                reflections.iter().map(|r| r.concern).sum::<f64>() / n,
            )
        };
        QuestioningVerdict {
            rationale: reflections.into_iter().map(|r| r.statement).collect(),
            mean_confidence,
            mean_concern,
            proceed: mean_confidence > self.min_confidence && mean_concern < self.max_concern,
        }
    }

    fn assess_risk(&self, process: &AutonomousProcess) -> RiskVerdict {
        let factors = self.scoring.risk_factors(process.process_type);
        let score = factors.iter().map(|f| f.score()).fold(0.0_f64, f64::max);
        let band = if score >= self.critical {
            RiskBand::Critical
        } else if score >= self.high {
            RiskBand::High
        } else if score >= self.medium {
            RiskBand::Medium
        } else {
            RiskBand::Low
        };
        RiskVerdict {
            factors,
            score,
            band,
            proceed: band < RiskBand::Critical,
        }
    }
}
