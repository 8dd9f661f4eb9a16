use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

use noema_config::NoemaConfig;

use crate::scheduler::ProcessScheduler;

/// Termination reason recorded for a time-budget overrun.
pub const TIME_LIMIT_EXCEEDED: &str = "time limit exceeded";

/// The periodic supervisory tick — the only place time-based forced
/// termination happens. One cooperative loop; a tick that would start
/// while the previous one is still in flight is skipped, not queued.
pub struct Monitor {
    scheduler: ProcessScheduler,
    config: Arc<RwLock<NoemaConfig>>,
    in_tick: AtomicBool,
}

impl Monitor {
    pub fn new(scheduler: ProcessScheduler, config: Arc<RwLock<NoemaConfig>>) -> Self {
        Self {
            scheduler,
            config,
            in_tick: AtomicBool::new(false),
        }
    }

    /// Run the supervisory loop. Spawn this as a background task.
    pub async fn run(self: Arc<Self>) {
        info!("monitor started");
        loop {
            let interval = self.config.read().monitor.interval_secs.max(1);
            tokio::time::sleep(std::time::Duration::from_secs(interval)).await;
            self.tick();
        }
    }

    /// One supervisory sweep over every process. Public so tests and
    /// operators can force a sweep without waiting for the interval.
    pub fn tick(&self) {
        if self
            .in_tick
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            debug!("previous tick still in flight — skipping");
            return;
        }
        self.sweep();
        self.in_tick.store(false, Ordering::Release);
    }

    /// Errors on one process never stop the sweep over the rest.
    fn sweep(&self) {
        let (overrun_factor, escalation_threshold) = {
            let config = self.config.read();
            (
                config.monitor.overrun_factor,
                config.monitor.escalation_threshold,
            )
        };

        // Hard cutoff: elapsed time past the overrun factor.
        for id in self.scheduler.overrun_ids(overrun_factor) {
            match self.scheduler.cancel(id, TIME_LIMIT_EXCEEDED) {
                Ok(_) => warn!(process_id = %id, "force-terminated overrun process"),
                Err(e) => {
                    warn!(process_id = %id, error = %e, "failed to terminate overrun process")
                }
            }
        }

        // Advisory escalations below the hard cutoff.
        for (id, ratio) in self.scheduler.escalation_candidates(escalation_threshold) {
            if let Err(e) = self.scheduler.escalate(id, ratio) {
                warn!(process_id = %id, error = %e, "failed to escalate process");
            }
        }

        // Release queued low-risk work, bounded by the concurrency
        // limit like everything else.
        for id in self.scheduler.pending_low_risk() {
            if let Err(e) = self.scheduler.approve_pending(id) {
                warn!(process_id = %id, error = %e, "failed to auto-approve process");
            }
        }
        self.scheduler.start_ready();
        debug!(running = self.scheduler.running_count(), "tick complete");
    }
}
