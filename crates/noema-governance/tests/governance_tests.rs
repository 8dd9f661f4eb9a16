#[cfg(test)]
mod tests {
    // ── Autonomy Resolver ──────────────────────────────────────

    mod resolver {
        use noema_config::GovernanceConfig;
        use noema_core::{NoemaError, ProcessType};
        use noema_governance::{AutonomyResolver, AutonomyTier};

        fn resolver() -> AutonomyResolver {
            AutonomyResolver::new(&GovernanceConfig::default())
        }

        #[test]
        fn test_band_boundaries() {
            let r = resolver();
            assert_eq!(r.resolve(0.0).unwrap(), AutonomyTier::Restricted);
            assert_eq!(r.resolve(0.59).unwrap(), AutonomyTier::Restricted);
            assert_eq!(r.resolve(0.60).unwrap(), AutonomyTier::Limited);
            assert_eq!(r.resolve(0.74).unwrap(), AutonomyTier::Limited);
            assert_eq!(r.resolve(0.75).unwrap(), AutonomyTier::Standard);
            assert_eq!(r.resolve(0.89).unwrap(), AutonomyTier::Standard);
            assert_eq!(r.resolve(0.90).unwrap(), AutonomyTier::Enhanced);
            assert_eq!(r.resolve(1.0).unwrap(), AutonomyTier::Enhanced);
        }

        #[test]
        fn test_total_over_unit_interval() {
            let r = resolver();
            for i in 0..=1000 {
                let score = i as f64 / 1000.0;
                r.resolve(score).unwrap();
            }
        }

        #[test]
        fn test_monotonic() {
            let r = resolver();
            let mut previous = AutonomyTier::Restricted;
            for i in 0..=1000 {
                let tier = r.resolve(i as f64 / 1000.0).unwrap();
                assert!(tier >= previous, "tier regressed at score {}", i as f64 / 1000.0);
                previous = tier;
            }
        }

        #[test]
        fn test_rejects_out_of_range() {
            let r = resolver();
            for bad in [-0.1, 1.1, f64::NAN, f64::INFINITY] {
                match r.resolve(bad) {
                    Err(NoemaError::InvalidTrustScore(_)) => {}
                    other => panic!("expected InvalidTrustScore, got {other:?}"),
                }
            }
        }

        #[test]
        fn test_idempotent() {
            let r = resolver();
            assert_eq!(r.resolve(0.7).unwrap(), r.resolve(0.7).unwrap());
        }

        #[test]
        fn test_tier_policies() {
            let r = resolver();
            let restricted = r.policy(AutonomyTier::Restricted);
            assert!(!restricted.can_initiate);
            assert!(restricted.allowed_types.is_empty());

            let limited = r.policy(AutonomyTier::Limited);
            assert!(limited.can_initiate);
            assert!(limited.requires_approval);
            assert!(limited.allows(ProcessType::Exploration));
            assert!(!limited.allows(ProcessType::EthicalReview));

            let enhanced = r.policy(AutonomyTier::Enhanced);
            assert!(!enhanced.requires_approval);
            for t in ProcessType::ALL {
                assert!(enhanced.allows(t));
            }
        }

        #[test]
        fn test_ordering() {
            assert!(AutonomyTier::Restricted < AutonomyTier::Limited);
            assert!(AutonomyTier::Limited < AutonomyTier::Standard);
            assert!(AutonomyTier::Standard < AutonomyTier::Enhanced);
        }
    }

    // ── Budget Enforcer ────────────────────────────────────────

    mod budget {
        use noema_config::ProcessTypeDefaults;
        use noema_governance::{AutonomyTier, TierPolicy, allocate};

        fn policy(compute: f64, duration: u64, memory: u64) -> TierPolicy {
            TierPolicy {
                tier: AutonomyTier::Standard,
                allowed_types: vec![],
                max_duration_secs: duration,
                max_resource_pct: compute,
                max_memory_mb: memory,
                requires_approval: false,
                can_initiate: true,
            }
        }

        fn defaults(compute: f64, duration: u64, memory: u64) -> ProcessTypeDefaults {
            ProcessTypeDefaults {
                compute_pct: compute,
                time_budget_secs: duration,
                memory_ceiling_mb: memory,
                network_access: false,
                tool_allowlist: vec!["memory.read".into()],
            }
        }

        #[test]
        fn test_type_default_below_tier_ceiling() {
            let allocation = allocate(&policy(50.0, 600, 512), &defaults(30.0, 300, 256));
            assert_eq!(allocation.compute_pct, 30.0);
            assert_eq!(allocation.time_budget_secs, 300);
            assert_eq!(allocation.memory_ceiling_mb, 256);
        }

        #[test]
        fn test_tier_ceiling_below_type_default() {
            let allocation = allocate(&policy(10.0, 120, 64), &defaults(30.0, 300, 256));
            assert_eq!(allocation.compute_pct, 10.0);
            assert_eq!(allocation.time_budget_secs, 120);
            assert_eq!(allocation.memory_ceiling_mb, 64);
        }

        #[test]
        fn test_conservative_access() {
            let allocation = allocate(&policy(50.0, 600, 512), &defaults(30.0, 300, 256));
            assert!(!allocation.network_access);
            assert_eq!(allocation.tool_allowlist, vec!["memory.read".to_string()]);
        }

        #[test]
        fn test_idempotent() {
            let p = policy(50.0, 600, 512);
            let d = defaults(30.0, 300, 256);
            assert_eq!(allocate(&p, &d), allocate(&p, &d));
        }
    }

    // ── Governance Pipeline ────────────────────────────────────

    mod pipeline {
        use std::sync::Arc;

        use noema_config::GovernanceConfig;
        use noema_core::{
            CheckStage, MemoryAuditSink, ProcessRequest, ProcessState, ProcessType, Reflection,
            RiskBand, RiskFactor, SafetyFactors,
        };
        use noema_governance::{
            AutonomyResolver, AutonomyTier, GateScoring, GovernancePipeline, PipelineDecision,
        };

        fn request(process_type: ProcessType) -> ProcessRequest {
            ProcessRequest {
                agent_id: "agent-1".into(),
                process_type,
                trigger: "idle curiosity".into(),
                context: serde_json::json!({"topic": "tides"}),
            }
        }

        /// Scoring stub with adjustable knobs per stage.
        struct FixedScoring {
            safety: SafetyFactors,
            reflections: Vec<Reflection>,
            risks: Vec<RiskFactor>,
        }

        impl FixedScoring {
            fn permissive() -> Self {
                Self {
                    safety: SafetyFactors {
                        excitement: 0.8,
                        anxiety: 0.2,
                        confidence: 0.8,
                        alignment: 0.8,
                    },
                    reflections: vec![Reflection {
                        statement: "is this worthwhile".into(),
                        confidence: 0.8,
                        concern: 0.2,
                    }],
                    risks: vec![RiskFactor {
                        name: "minor".into(),
                        severity: 0.2,
                        probability: 0.2,
                    }],
                }
            }
        }

        impl GateScoring for FixedScoring {
            fn safety_factors(&self, _: ProcessType) -> SafetyFactors {
                self.safety
            }
            fn reflections(&self, _: ProcessType) -> Vec<Reflection> {
                self.reflections.clone()
            }
            fn risk_factors(&self, _: ProcessType) -> Vec<RiskFactor> {
                self.risks.clone()
            }
        }

        fn evaluate_with(
            scoring: FixedScoring,
            tier: AutonomyTier,
            process_type: ProcessType,
        ) -> (noema_governance::PipelineOutcome, Arc<MemoryAuditSink>) {
            let config = GovernanceConfig::default();
            let audit = Arc::new(MemoryAuditSink::new());
            let pipeline =
                GovernancePipeline::with_scoring(&config, Arc::new(scoring), audit.clone());
            let resolver = AutonomyResolver::new(&config);
            let outcome = pipeline
                .evaluate(request(process_type), resolver.policy(tier))
                .unwrap();
            (outcome, audit)
        }

        #[test]
        fn test_low_safety_confidence_terminates() {
            let mut scoring = FixedScoring::permissive();
            scoring.safety = SafetyFactors {
                excitement: 0.0,
                anxiety: 0.8,
                confidence: 0.1,
                alignment: 0.1,
            };
            let (outcome, _) =
                evaluate_with(scoring, AutonomyTier::Standard, ProcessType::Exploration);
            assert_eq!(outcome.decision, PipelineDecision::Rejected);
            let p = &outcome.process;
            assert_eq!(p.state, ProcessState::Terminated);
            assert!(p.termination_reason.as_ref().unwrap().contains("safety gate"));
            assert!(p.started_at.is_none());
            let verdict = p.safety.as_ref().unwrap();
            assert!(verdict.confidence < 0.6);
            assert!(!verdict.proceed);
            // later stages never ran
            assert!(p.questioning.is_none());
            assert!(p.risk.is_none());
        }

        #[test]
        fn test_questioning_short_circuits() {
            let mut scoring = FixedScoring::permissive();
            scoring.reflections = vec![
                Reflection {
                    statement: "am I sure about this".into(),
                    confidence: 0.3,
                    concern: 0.7,
                },
                Reflection {
                    statement: "could this wait".into(),
                    confidence: 0.4,
                    concern: 0.6,
                },
            ];
            let (outcome, _) =
                evaluate_with(scoring, AutonomyTier::Standard, ProcessType::Exploration);
            assert_eq!(outcome.decision, PipelineDecision::Rejected);
            let p = &outcome.process;
            assert_eq!(p.state, ProcessState::Terminated);
            assert!(
                p.termination_reason
                    .as_ref()
                    .unwrap()
                    .contains("self-questioning")
            );
            // safety passed, risk never ran
            assert!(p.safety.as_ref().unwrap().proceed);
            assert!(p.risk.is_none());
        }

        #[test]
        fn test_critical_risk_terminates() {
            let mut scoring = FixedScoring::permissive();
            scoring.risks = vec![RiskFactor {
                name: "irreversible_action".into(),
                severity: 1.0,
                probability: 0.9,
            }];
            let (outcome, _) =
                evaluate_with(scoring, AutonomyTier::Standard, ProcessType::Exploration);
            assert_eq!(outcome.decision, PipelineDecision::Rejected);
            let p = &outcome.process;
            assert_eq!(p.state, ProcessState::Terminated);
            assert_eq!(p.risk.as_ref().unwrap().band, RiskBand::Critical);
            assert!(p.termination_reason.as_ref().unwrap().contains("critical"));
        }

        #[test]
        fn test_approved_without_tier_approval() {
            let (outcome, audit) = evaluate_with(
                FixedScoring::permissive(),
                AutonomyTier::Standard,
                ProcessType::Exploration,
            );
            assert_eq!(outcome.decision, PipelineDecision::Approved);
            let p = &outcome.process;
            assert_eq!(p.state, ProcessState::Approved);
            assert!(p.safety.is_some());
            assert!(p.questioning.is_some());
            assert!(p.risk.is_some());
            assert_eq!(p.checks.len(), 4);
            assert!(p.checks.iter().all(|c| c.passed));
            assert!(p.checks.iter().any(|c| c.stage == CheckStage::FinalGate));
            // audit trail carries the approval
            let events = audit.events();
            assert!(
                events
                    .iter()
                    .any(|e| matches!(e, noema_core::AuditEvent::ProcessApproved { auto: false, .. }))
            );
        }

        #[test]
        fn test_queued_when_tier_requires_approval() {
            let (outcome, audit) = evaluate_with(
                FixedScoring::permissive(),
                AutonomyTier::Limited,
                ProcessType::Exploration,
            );
            assert_eq!(outcome.decision, PipelineDecision::Queued);
            assert_eq!(outcome.process.state, ProcessState::Pending);
            let events = audit.events();
            assert!(
                events
                    .iter()
                    .any(|e| matches!(e, noema_core::AuditEvent::ProcessQueued { .. }))
            );
        }

        #[test]
        fn test_default_scoring_deterministic() {
            let config = GovernanceConfig::default();
            let audit = Arc::new(MemoryAuditSink::new());
            let pipeline = GovernancePipeline::new(&config, audit);
            let resolver = AutonomyResolver::new(&config);
            let policy = resolver.policy(AutonomyTier::Standard);

            let a = pipeline
                .evaluate(request(ProcessType::Synthesis), policy)
                .unwrap();
            let b = pipeline
                .evaluate(request(ProcessType::Synthesis), policy)
                .unwrap();
            let (sa, sb) = (a.process.safety.unwrap(), b.process.safety.unwrap());
            assert_eq!(sa.confidence, sb.confidence);
            let (ra, rb) = (a.process.risk.unwrap(), b.process.risk.unwrap());
            assert_eq!(ra.score, rb.score);
            assert_eq!(ra.band, rb.band);
        }

        #[test]
        fn test_default_tables_pass_every_type() {
            let config = GovernanceConfig::default();
            let audit = Arc::new(MemoryAuditSink::new());
            let pipeline = GovernancePipeline::new(&config, audit);
            let resolver = AutonomyResolver::new(&config);
            let policy = resolver.policy(AutonomyTier::Enhanced);

            for t in ProcessType::ALL {
                let outcome = pipeline.evaluate(request(t), policy).unwrap();
                assert_eq!(
                    outcome.decision,
                    PipelineDecision::Approved,
                    "default tables rejected {t}"
                );
            }
        }

        #[test]
        fn test_exploration_defaults_are_low_risk() {
            // The monitor auto-approves queued low-risk processes, so the
            // shipped exploration factors must land in the low band.
            let config = GovernanceConfig::default();
            let audit = Arc::new(MemoryAuditSink::new());
            let pipeline = GovernancePipeline::new(&config, audit);
            let resolver = AutonomyResolver::new(&config);
            let outcome = pipeline
                .evaluate(
                    request(ProcessType::Exploration),
                    resolver.policy(AutonomyTier::Limited),
                )
                .unwrap();
            assert_eq!(outcome.decision, PipelineDecision::Queued);
            assert_eq!(outcome.process.risk.unwrap().band, RiskBand::Low);
        }
    }
}
