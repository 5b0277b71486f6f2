use tokio::sync::broadcast;
use tracing::trace;

const CHANNEL_CAPACITY: usize = 64;

/// Cross-feature refresh notifications, published after a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    AnniversaryUpdated,
    AvatarUpdated,
    NicknameUpdated,
    FriendUpdated,
}

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AppEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.tx.subscribe()
    }

    /// Fire and forget; having no listeners is normal.
    pub fn publish(&self, event: AppEvent) {
        trace!(?event, "publish");
        let _ = self.tx.send(event);
    }
}
