use domain::Message;
use tokio::sync::broadcast;
use tracing::debug;

/// Event fanned out to active subscription connections.
///
/// `Shutdown` is sent exactly once, when the server begins draining;
/// every subscription stream terminates on receiving it.
#[derive(Debug, Clone)]
pub enum BusEvent {
    MessageSent(Message),
    Shutdown,
}

/// In-process publish/subscribe handle shared by all resolvers.
///
/// A thin wrapper over a `tokio::sync::broadcast` channel. Delivery to each
/// subscriber preserves publish order; the bus holds no durable state.
#[derive(Clone)]
pub struct MessageBus {
    tx: broadcast::Sender<BusEvent>,
}

impl MessageBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish a newly created message. Returns the number of subscribers
    /// that received it; publishing with no subscribers is not an error.
    pub fn publish(&self, message: Message) -> usize {
        debug!(
            message_id = %message.id,
            conversation_id = %message.conversation_id,
            "publishing message"
        );
        self.tx.send(BusEvent::MessageSent(message)).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.tx.subscribe()
    }

    /// Tell every subscription stream to dispose itself. Called before the
    /// HTTP listener closes so that drains happen in the right order.
    pub fn shutdown(&self) -> usize {
        debug!("shutting down message bus");
        self.tx.send(BusEvent::Shutdown).unwrap_or(0)
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new(256)
    }
}
