//! Human pause: a single pending-confirmation slot that suspends the running
//! script until an operator acknowledges it out of band.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::oneshot;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AutostepError, Result};
use crate::events::{EventBus, OrchestratorEvent};

/// Snapshot of the confirmation currently awaited.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingConfirmation {
    pub id: Uuid,
    pub site: String,
    pub script: String,
    pub message: String,
    pub requested_at: DateTime<Utc>,
}

struct Slot {
    request: PendingConfirmation,
    ack: oneshot::Sender<()>,
}

/// At most one confirmation is outstanding; there is no timeout.
pub struct ConfirmationGate {
    slot: Mutex<Option<Slot>>,
    events: EventBus,
}

impl ConfirmationGate {
    pub fn new(events: EventBus) -> Self {
        Self {
            slot: Mutex::new(None),
            events,
        }
    }

    /// Suspend until [`acknowledge`](Self::acknowledge) is called.
    ///
    /// A new request replaces a stale one; the replaced waiter resolves with
    /// [`AutostepError::ConfirmationDropped`].
    pub async fn request(&self, site: &str, script: &str, message: &str) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let request = PendingConfirmation {
            id: Uuid::new_v4(),
            site: site.to_string(),
            script: script.to_string(),
            message: message.to_string(),
            requested_at: Utc::now(),
        };

        let replaced = self.lock().replace(Slot { request, ack: tx });
        if let Some(old) = replaced {
            warn!(site = %old.request.site, script = %old.request.script, "replacing unacknowledged confirmation");
        }

        info!(site, script, message, "waiting for human confirmation");
        self.events.publish(OrchestratorEvent::HumanRequired {
            site: site.to_string(),
            script: script.to_string(),
            message: message.to_string(),
        });

        rx.await.map_err(|_| AutostepError::ConfirmationDropped)
    }

    /// Release the pending waiter. Returns `false` when nothing was pending.
    pub fn acknowledge(&self) -> bool {
        let Some(slot) = self.lock().take() else {
            return false;
        };
        let delivered = slot.ack.send(()).is_ok();
        if delivered {
            info!(site = %slot.request.site, script = %slot.request.script, "human confirmation acknowledged");
            self.events.publish(OrchestratorEvent::HumanAcknowledged);
        }
        delivered
    }

    pub fn pending(&self) -> Option<PendingConfirmation> {
        self.lock().as_ref().map(|s| s.request.clone())
    }

    fn lock(&self) -> MutexGuard<'_, Option<Slot>> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ConfirmationGate {
    fn default() -> Self {
        Self::new(EventBus::new())
    }
}
