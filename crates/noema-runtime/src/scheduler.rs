use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, warn};

use noema_config::NoemaConfig;
use noema_core::{
    AuditEvent, AuditSink, AutonomousProcess, CheckStage, ConflictEscalation, EngineInput,
    EngineOutcome, NoemaError, ProcessId, ProcessSnapshot, ProcessState, Result, RiskBand,
};

use crate::engines::EngineRegistry;

struct SchedulerState {
    processes: HashMap<ProcessId, AutonomousProcess>,
    /// Approved processes waiting for a free concurrency slot.
    ready: VecDeque<ProcessId>,
    /// Count of processes currently in the `running` state.
    running: usize,
}

/// Owns every process collection: the active set, the ready queue, and
/// the pending pool awaiting approval. All mutations on a given process
/// go through the single state lock, so two operations never race on
/// the same process id. Cheap to clone: engine completion tasks carry
/// a clone back into the state.
#[derive(Clone)]
pub struct ProcessScheduler {
    state: Arc<Mutex<SchedulerState>>,
    config: Arc<RwLock<NoemaConfig>>,
    engines: Arc<EngineRegistry>,
    audit: Arc<dyn AuditSink>,
}

impl ProcessScheduler {
    pub fn new(
        config: Arc<RwLock<NoemaConfig>>,
        engines: Arc<EngineRegistry>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(SchedulerState {
                processes: HashMap::new(),
                ready: VecDeque::new(),
                running: 0,
            })),
            config,
            engines,
            audit,
        }
    }

    /// Submit a newly approved process. Fails fast with a capacity
    /// error when every slot is busy. New submissions are never parked
    /// silently, and existing processes are left untouched.
    pub fn submit(&self, process: AutonomousProcess) -> Result<ProcessSnapshot> {
        let max = self.config.read().scheduler.max_concurrent;
        let mut st = self.state.lock();
        if st.running >= max {
            return Err(NoemaError::CapacityExhausted {
                active: st.running,
                limit: max,
            });
        }
        let id = process.id;
        st.processes.insert(id, process);
        st.ready.push_back(id);
        self.start_ready_locked(&mut st, max);
        st.processes
            .get(&id)
            .map(|p| p.snapshot())
            .ok_or(NoemaError::ProcessNotFound(id))
    }

    /// Park a `pending` process for the monitor (or a caller) to
    /// release later. Pending processes do not occupy a slot.
    pub fn enqueue_pending(&self, process: AutonomousProcess) -> ProcessSnapshot {
        let snapshot = process.snapshot();
        self.state.lock().processes.insert(process.id, process);
        snapshot
    }

    /// Retain a process that ended before ever reaching the scheduler
    /// (pipeline rejection), so callers can still read it back.
    pub fn adopt_terminal(&self, process: AutonomousProcess) -> ProcessSnapshot {
        let snapshot = process.snapshot();
        self.state.lock().processes.insert(process.id, process);
        snapshot
    }

    /// Start queued approved processes while slots are free.
    pub fn start_ready(&self) {
        let max = self.config.read().scheduler.max_concurrent;
        let mut st = self.state.lock();
        self.start_ready_locked(&mut st, max);
    }

    fn start_ready_locked(&self, st: &mut SchedulerState, max: usize) {
        while st.running < max {
            let Some(id) = st.ready.pop_front() else {
                break;
            };
            let Some(process) = st.processes.get_mut(&id) else {
                continue;
            };
            // Cancelled while waiting in the queue.
            if process.state != ProcessState::Approved {
                continue;
            }
            let Some(allocation) = process.allocation.clone() else {
                warn!(process_id = %id, "approved process has no allocation — terminating");
                if process.terminate("no resource allocation").is_ok() {
                    self.audit.record(AuditEvent::ProcessTerminated {
                        process_id: id,
                        reason: "no resource allocation".into(),
                    });
                }
                continue;
            };
            let Some(engine) = self.engines.get(process.process_type) else {
                let reason = format!("no engine registered for '{}'", process.process_type);
                warn!(process_id = %id, process_type = %process.process_type, "no engine registered");
                if process.terminate(&reason).is_ok() {
                    self.audit.record(AuditEvent::ProcessTerminated {
                        process_id: id,
                        reason,
                    });
                }
                continue;
            };
            if let Err(e) = process.start() {
                warn!(process_id = %id, error = %e, "failed to start process");
                continue;
            }
            st.running += 1;
            self.audit
                .record(AuditEvent::ProcessStarted { process_id: id });
            info!(
                process_id = %id,
                process_type = %process.process_type,
                agent_id = %process.agent_id,
                running = st.running,
                "process started"
            );

            let input = EngineInput {
                process_id: id,
                agent_id: process.agent_id.clone(),
                process_type: process.process_type,
                trigger: process.trigger.clone(),
                context: process.context.clone(),
                allocation,
            };
            let scheduler = self.clone();
            // The engine runs on its own task so one slow process never
            // blocks submission of others.
            tokio::spawn(async move {
                let result = engine.run(input).await;
                scheduler.finish(id, result);
            });
        }
    }

    /// Fold an engine result into its process. A result arriving for a
    /// process no longer `running` (cancelled in the meantime) is
    /// discarded.
    fn finish(&self, id: ProcessId, result: Result<EngineOutcome>) {
        {
            let mut st = self.state.lock();
            let Some(process) = st.processes.get_mut(&id) else {
                debug!(process_id = %id, "engine result for unknown process discarded");
                return;
            };
            if process.state != ProcessState::Running {
                debug!(
                    process_id = %id,
                    state = %process.state,
                    "late engine result discarded"
                );
                return;
            }
            match result {
                Ok(outcome) => {
                    process.record_usage(outcome.compute_pct, outcome.memory_mb);
                    process.steps.extend(outcome.steps);
                    if let Err(e) = process.complete(outcome.summary) {
                        warn!(process_id = %id, error = %e, "failed to complete process");
                    } else {
                        self.audit
                            .record(AuditEvent::ProcessCompleted { process_id: id });
                        info!(process_id = %id, "process completed");
                    }
                }
                Err(e) => {
                    let reason = e.to_string();
                    if let Err(e2) = process.fail(&reason) {
                        warn!(process_id = %id, error = %e2, "failed to record engine failure");
                    } else {
                        self.audit.record(AuditEvent::ProcessFailed {
                            process_id: id,
                            reason: reason.clone(),
                        });
                        warn!(process_id = %id, reason = %reason, "engine failed");
                    }
                }
            }
            st.running = st.running.saturating_sub(1);
        }
        // The freed slot may unblock queued approved work.
        self.start_ready();
    }

    /// Record live usage for a running process. Peaks only go up; once
    /// the process left `running` nothing more is recorded and `false`
    /// comes back.
    pub fn record_usage(&self, id: ProcessId, compute_pct: f64, memory_mb: f64) -> Result<bool> {
        let mut st = self.state.lock();
        let process = st
            .processes
            .get_mut(&id)
            .ok_or(NoemaError::ProcessNotFound(id))?;
        Ok(process.record_usage(compute_pct, memory_mb))
    }

    /// Cancel one process: `running|pending|approved → terminated`,
    /// releasing the slot if it held one. Idempotent on terminal
    /// processes.
    pub fn cancel(&self, id: ProcessId, reason: &str) -> Result<ProcessSnapshot> {
        let snapshot = {
            let mut st = self.state.lock();
            let st = &mut *st;
            let process = st
                .processes
                .get_mut(&id)
                .ok_or(NoemaError::ProcessNotFound(id))?;
            if process.state.is_terminal() {
                return Ok(process.snapshot());
            }
            let was_running = process.state == ProcessState::Running;
            process.terminate(reason)?;
            self.audit.record(AuditEvent::ProcessTerminated {
                process_id: id,
                reason: reason.to_string(),
            });
            info!(process_id = %id, reason = %reason, "process terminated");
            if was_running {
                st.running = st.running.saturating_sub(1);
            }
            process.snapshot()
        };
        self.start_ready();
        Ok(snapshot)
    }

    /// Emergency stop, scoped to one agent: terminates every
    /// non-terminal process it owns. Returns how many were stopped.
    pub fn cancel_all(&self, agent_id: &str, reason: &str) -> usize {
        let count = {
            let mut st = self.state.lock();
            let mut stopped = 0;
            let mut freed = 0;
            for process in st.processes.values_mut() {
                if process.agent_id != agent_id || process.state.is_terminal() {
                    continue;
                }
                let was_running = process.state == ProcessState::Running;
                if let Err(e) = process.terminate(reason) {
                    warn!(process_id = %process.id, error = %e, "failed to terminate process");
                    continue;
                }
                self.audit.record(AuditEvent::ProcessTerminated {
                    process_id: process.id,
                    reason: reason.to_string(),
                });
                stopped += 1;
                if was_running {
                    freed += 1;
                }
            }
            st.running = st.running.saturating_sub(freed);
            if stopped > 0 {
                info!(agent_id, stopped, "emergency stop");
            }
            stopped
        };
        self.start_ready();
        count
    }

    pub fn snapshot(&self, id: ProcessId) -> Option<ProcessSnapshot> {
        self.state.lock().processes.get(&id).map(|p| p.snapshot())
    }

    /// Non-terminal processes owned by one agent.
    pub fn active(&self, agent_id: &str) -> Vec<ProcessSnapshot> {
        self.state
            .lock()
            .processes
            .values()
            .filter(|p| p.agent_id == agent_id && !p.state.is_terminal())
            .map(|p| p.snapshot())
            .collect()
    }

    /// Count of processes currently in the `running` state.
    pub fn running_count(&self) -> usize {
        self.state.lock().running
    }

    /// Remove and return a terminal process. Non-terminal processes are
    /// left in place and `None` comes back.
    pub fn reap(&self, id: ProcessId) -> Option<AutonomousProcess> {
        let mut st = self.state.lock();
        if st.processes.get(&id).is_some_and(|p| p.state.is_terminal()) {
            st.processes.remove(&id)
        } else {
            None
        }
    }

    // ── Monitor support ────────────────────────────────────────
    //
    // The monitor only ever transitions `running → terminated`, raises
    // escalations, and releases pending work; each of these goes
    // through the scheduler so every mutation stays behind one lock.

    /// Running processes whose elapsed time exceeds `factor ×` their
    /// time budget.
    pub fn overrun_ids(&self, factor: f64) -> Vec<ProcessId> {
        let st = self.state.lock();
        st.processes
            .values()
            .filter(|p| p.state == ProcessState::Running)
            .filter_map(|p| {
                let budget = p.allocation.as_ref()?.time_budget_secs as f64;
                let elapsed = p.elapsed_secs()?;
                (elapsed > factor * budget).then_some(p.id)
            })
            .collect()
    }

    /// Running processes whose compute usage ratio crossed the
    /// escalation threshold and that have not been escalated yet.
    pub fn escalation_candidates(&self, threshold: f64) -> Vec<(ProcessId, f64)> {
        let st = self.state.lock();
        st.processes
            .values()
            .filter(|p| p.state == ProcessState::Running && !p.escalated)
            .filter_map(|p| {
                let ratio = p.compute_ratio()?;
                (ratio > threshold).then_some((p.id, ratio))
            })
            .collect()
    }

    /// Raise one advisory escalation on a running process. No-op if the
    /// process already left `running` or was escalated before.
    pub fn escalate(&self, id: ProcessId, usage_ratio: f64) -> Result<()> {
        let mut st = self.state.lock();
        let process = st
            .processes
            .get_mut(&id)
            .ok_or(NoemaError::ProcessNotFound(id))?;
        if process.state != ProcessState::Running || process.escalated {
            return Ok(());
        }
        process.escalated = true;
        process.escalations.push(ConflictEscalation {
            at: Utc::now(),
            usage_ratio,
            note: format!("compute usage at {:.0}% of allocation", usage_ratio * 100.0),
        });
        process.push_check(
            CheckStage::Monitor,
            true,
            format!("escalated at usage ratio {usage_ratio:.2}"),
        );
        self.audit.record(AuditEvent::ProcessEscalated {
            process_id: id,
            usage_ratio,
        });
        warn!(process_id = %id, usage_ratio, "process escalated");
        Ok(())
    }

    /// Pending processes whose risk verdict came back `low`.
    pub fn pending_low_risk(&self) -> Vec<ProcessId> {
        let st = self.state.lock();
        st.processes
            .values()
            .filter(|p| {
                p.state == ProcessState::Pending
                    && p.risk.as_ref().is_some_and(|r| r.band == RiskBand::Low)
            })
            .map(|p| p.id)
            .collect()
    }

    /// Auto-approve a pending process and queue it for a slot. The
    /// caller follows up with [`start_ready`](Self::start_ready).
    pub fn approve_pending(&self, id: ProcessId) -> Result<()> {
        let mut st = self.state.lock();
        let process = st
            .processes
            .get_mut(&id)
            .ok_or(NoemaError::ProcessNotFound(id))?;
        if process.state != ProcessState::Pending {
            return Ok(());
        }
        process.approve()?;
        process.push_check(CheckStage::Monitor, true, "auto-approved low-risk process");
        st.ready.push_back(id);
        self.audit.record(AuditEvent::ProcessApproved {
            process_id: id,
            auto: true,
        });
        info!(process_id = %id, "pending process auto-approved");
        Ok(())
    }
}
