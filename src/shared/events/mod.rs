use crate::domain::events::RosterEvent;
use crate::domain::ports::event_bus::EventBus;
use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

/// Local in-memory implementation of EventBus
#[derive(Clone)]
pub struct LocalEventBus {
    tx: broadcast::Sender<RosterEvent>,
}

impl LocalEventBus {
    /// Create a new event bus with specified capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[async_trait]
impl EventBus for LocalEventBus {
    fn publish(&self, event: RosterEvent) -> ApiResult<()> {
        // Fire-and-forget: nobody listening is not a failure of the caller
        if let Err(e) = self.tx.send(event) {
            tracing::debug!("No active subscribers for event: {}", e);
        }
        Ok(())
    }

    fn subscribe(&self) -> Pin<Box<dyn Stream<Item = Result<RosterEvent, String>> + Send>> {
        let rx = self.tx.subscribe();
        Box::pin(BroadcastStream::new(rx).map(|item| item.map_err(|e| e.to_string())))
    }
}
