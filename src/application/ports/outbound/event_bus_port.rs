//! Event bus port - outbound notifications to sibling features

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("Event bus is closed")]
    Closed,
}

/// Publishes events to whoever is listening.
///
/// Having no listeners is not an error.
#[async_trait]
pub trait EventBusPort<E: Send + 'static>: Send + Sync {
    async fn publish(&self, event: E) -> Result<(), EventBusError>;
}
