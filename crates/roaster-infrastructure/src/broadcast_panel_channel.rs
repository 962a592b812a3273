//! In-process router -> panel channel.

use async_trait::async_trait;
use roaster_core::host::{Delivery, PanelChannel};
use roaster_core::message::Message;
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 64;

/// Fans router notifications out to every subscribed panel.
///
/// With no subscriber attached a broadcast is dropped, the same way a host
/// reports "receiving end does not exist" when no panel is open.
#[derive(Debug, Clone)]
pub struct BroadcastPanelChannel {
    sender: broadcast::Sender<Message>,
}

impl BroadcastPanelChannel {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Attaches a panel. Dropping the receiver detaches it.
    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.sender.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastPanelChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PanelChannel for BroadcastPanelChannel {
    async fn broadcast(&self, message: Message) -> Delivery {
        let kind = message.kind();
        match self.sender.send(message) {
            Ok(listeners) => {
                tracing::debug!("[PanelChannel] {} delivered to {} listener(s)", kind, listeners);
                Delivery::Delivered
            }
            Err(_) => {
                tracing::debug!("[PanelChannel] {} dropped: no listener", kind);
                Delivery::Dropped
            }
        }
    }
}
