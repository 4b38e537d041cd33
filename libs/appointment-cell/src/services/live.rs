use tokio::sync::broadcast;
use tracing::debug;

use crate::models::AppointmentUpdate;

/// In-process fan-out of appointment status changes. Subscribers that fall
/// behind lose the oldest events; clients reload on reconnect.
#[derive(Clone)]
pub struct AppointmentUpdates {
    sender: broadcast::Sender<AppointmentUpdate>,
}

impl AppointmentUpdates {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, update: AppointmentUpdate) {
        // No subscribers is not an error.
        let receivers = self.sender.send(update.clone()).unwrap_or(0);
        debug!("Published status {} of appointment {} to {} subscribers", update.status, update.id, receivers);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppointmentUpdate> {
        self.sender.subscribe()
    }
}

impl Default for AppointmentUpdates {
    fn default() -> Self {
        Self::new(256)
    }
}
