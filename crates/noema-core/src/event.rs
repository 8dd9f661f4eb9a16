use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::gate::CheckStage;
use crate::process::ProcessType;

/// Governance decisions flowing out of the core. Every approval,
/// rejection, start, and termination produces exactly one event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditEvent {
    ProcessRequested {
        process_id: Uuid,
        agent_id: String,
        process_type: ProcessType,
        trigger: String,
    },
    TierResolved {
        agent_id: String,
        trust_score: f64,
        tier: String,
    },
    GatePassed {
        process_id: Uuid,
        stage: CheckStage,
        note: String,
    },
    GateRejected {
        process_id: Uuid,
        stage: CheckStage,
        reason: String,
    },
    ProcessQueued {
        process_id: Uuid,
    },
    ProcessApproved {
        process_id: Uuid,
        /// True when the monitor auto-approved a queued low-risk process.
        auto: bool,
    },
    ProcessStarted {
        process_id: Uuid,
    },
    ProcessCompleted {
        process_id: Uuid,
    },
    ProcessFailed {
        process_id: Uuid,
        reason: String,
    },
    ProcessTerminated {
        process_id: Uuid,
        reason: String,
    },
    ProcessEscalated {
        process_id: Uuid,
        usage_ratio: f64,
    },
}

/// Receives governance events. Best-effort and loss-tolerant:
/// implementations must not block and must not fail.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// Default sink — logs every event through `tracing`.
#[derive(Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        match &event {
            AuditEvent::GateRejected {
                process_id,
                stage,
                reason,
            } => {
                info!(process_id = %process_id, stage = %stage, reason = %reason, "audit: gate rejected");
            }
            AuditEvent::ProcessTerminated { process_id, reason } => {
                info!(process_id = %process_id, reason = %reason, "audit: process terminated");
            }
            other => {
                info!(event = ?other, "audit");
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Default)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn record(&self, _event: AuditEvent) {}
}

/// Buffers events in memory for later inspection. Used in tests and
/// anywhere a caller wants to read the trail back out.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        self.events.lock().push(event);
    }
}
