use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::events::CompetitionEvent;

const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Event bus for distributing competition events throughout the application
#[derive(Debug, Clone)]
pub struct EventBus {
    /// competition_id -> sender
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<CompetitionEvent>>>>,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Emits an event to all subscribers of a competition
    pub async fn emit(&self, competition_id: &str, event: CompetitionEvent) {
        let sender = self.sender(competition_id).await;
        let event_type = event.event_type();

        match sender.send(event) {
            Ok(receivers) => {
                debug!(
                    competition_id = %competition_id,
                    event_type,
                    receivers,
                    "Competition event emitted"
                );
            }
            Err(_) => {
                debug!(
                    competition_id = %competition_id,
                    event_type,
                    "Competition event emitted with no receivers"
                );
            }
        }
    }

    pub async fn subscribe(&self, competition_id: &str) -> broadcast::Receiver<CompetitionEvent> {
        self.sender(competition_id).await.subscribe()
    }

    async fn sender(&self, competition_id: &str) -> broadcast::Sender<CompetitionEvent> {
        {
            let channels = self.channels.read().await;
            if let Some(sender) = channels.get(competition_id) {
                return sender.clone();
            }
        }

        debug!(competition_id = %competition_id, "Creating competition channel");
        let mut channels = self.channels.write().await;
        channels
            .entry(competition_id.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_only_to_matching_competition() {
        let bus = EventBus::new();
        let mut cup = bus.subscribe("cup").await;
        let mut other = bus.subscribe("other").await;

        bus.emit(
            "cup",
            CompetitionEvent::BracketReset { deleted_matches: 3 },
        )
        .await;

        let event = cup.recv().await.unwrap();
        assert!(matches!(
            event,
            CompetitionEvent::BracketReset { deleted_matches: 3 }
        ));
        assert!(other.try_recv().is_err());
    }

    #[tokio::test]
    async fn emitting_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.emit(
            "nobody",
            CompetitionEvent::BracketReset { deleted_matches: 0 },
        )
        .await;
    }
}
