use tokio::sync::broadcast;

use crate::domain::models::TaskRefresh;

const REFRESH_CAPACITY: usize = 16;

/// Fire-and-forget notification that task data may have changed.
///
/// Subscribers only see signals emitted after they subscribed.
#[derive(Clone)]
pub struct RefreshSignal {
    tx: broadcast::Sender<TaskRefresh>,
}

impl Default for RefreshSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshSignal {
    pub fn new() -> RefreshSignal {
        let (tx, _) = broadcast::channel(REFRESH_CAPACITY);
        RefreshSignal { tx }
    }

    /// Returns how many subscribers the signal reached.
    pub fn emit(&self, refresh: TaskRefresh) -> usize {
        tracing::debug!(intent = %refresh.intent, "emitting task refresh");
        // No subscribers is fine.
        self.tx.send(refresh).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TaskRefresh> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
