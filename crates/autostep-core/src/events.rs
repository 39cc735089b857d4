use serde::Serialize;
use tokio::sync::broadcast;

/// Operator-visible notifications published by the orchestrator and the
/// human confirmation gate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrchestratorEvent {
    JobQueued {
        id: String,
    },
    JobStarted {
        id: String,
        site: String,
        script: String,
    },
    JobSucceeded {
        id: String,
    },
    JobFailed {
        id: String,
        error: String,
    },
    HumanRequired {
        site: String,
        script: String,
        message: String,
    },
    HumanAcknowledged,
}

impl OrchestratorEvent {
    /// SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::JobQueued { .. } => "job_queued",
            Self::JobStarted { .. } => "job_started",
            Self::JobSucceeded { .. } => "job_succeeded",
            Self::JobFailed { .. } => "job_failed",
            Self::HumanRequired { .. } => "human_required",
            Self::HumanAcknowledged => "human_acknowledged",
        }
    }
}

/// Broadcast channel for [`OrchestratorEvent`]s. Publishing without
/// subscribers is not an error.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<OrchestratorEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    pub fn publish(&self, event: OrchestratorEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrchestratorEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
