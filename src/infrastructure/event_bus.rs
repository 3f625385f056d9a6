//! Broadcast event bus
//!
//! Fans encounter events out to every WebSocket subscriber. Slow subscribers
//! lag and skip events rather than holding up the publisher. Closing the bus
//! ends every subscriber stream.

use std::sync::RwLock;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::application::ports::outbound::{EventBusError, EventBusPort};

pub struct BroadcastEventBus<E> {
    sender: RwLock<Option<broadcast::Sender<E>>>,
}

impl<E: Clone + Send + 'static> BroadcastEventBus<E> {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: RwLock::new(Some(sender)),
        }
    }

    /// `None` once the bus has been closed
    pub fn subscribe(&self) -> Option<broadcast::Receiver<E>> {
        let sender = self.sender.read().unwrap_or_else(|e| e.into_inner());
        sender.as_ref().map(broadcast::Sender::subscribe)
    }

    pub fn close(&self) {
        let mut sender = self.sender.write().unwrap_or_else(|e| e.into_inner());
        *sender = None;
    }
}

#[async_trait]
impl<E: Clone + Send + Sync + 'static> EventBusPort<E> for BroadcastEventBus<E> {
    async fn publish(&self, event: E) -> Result<(), EventBusError> {
        let sender = self.sender.read().unwrap_or_else(|e| e.into_inner());
        let Some(sender) = sender.as_ref() else {
            return Err(EventBusError::Closed);
        };

        match sender.send(event) {
            Ok(receivers) => tracing::trace!(receivers, "Broadcast event"),
            Err(_) => tracing::trace!("No subscribers for event"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let bus = BroadcastEventBus::new(8);
        let mut first = bus.subscribe().unwrap();
        let mut second = bus.subscribe().unwrap();

        bus.publish("round 2".to_string()).await.unwrap();

        assert_eq!(first.recv().await.unwrap(), "round 2");
        assert_eq!(second.recv().await.unwrap(), "round 2");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let bus: BroadcastEventBus<u32> = BroadcastEventBus::new(8);
        assert!(bus.publish(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_close_ends_subscribers() {
        let bus: BroadcastEventBus<u32> = BroadcastEventBus::new(8);
        let mut receiver = bus.subscribe().unwrap();

        bus.close();

        assert!(receiver.recv().await.is_err());
        assert!(bus.subscribe().is_none());
        assert!(matches!(bus.publish(1).await, Err(EventBusError::Closed)));
    }
}
