use dashmap::DashMap;
use db::events::BoardEvent;
use tokio::sync::broadcast;
use uuid::Uuid;

const TOPIC_CAPACITY: usize = 256;

/// Per-board publish/subscribe fan-out over broadcast channels.
///
/// Constructed once at startup and handed to each service, so a service can
/// only exist with a working broadcaster behind it. Topics live for the
/// process lifetime; nothing is replayed to late subscribers and nothing
/// survives a restart.
#[derive(Default)]
pub struct EventService {
    topics: DashMap<Uuid, broadcast::Sender<BoardEvent>>,
}

impl EventService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins a board's channel, creating the topic on first use.
    pub fn subscribe(&self, board_id: Uuid) -> broadcast::Receiver<BoardEvent> {
        self.topics
            .entry(board_id)
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
            .subscribe()
    }

    /// Fire-and-forget delivery to the event's board. A board nobody has
    /// joined has no topic, and a send error only means every subscriber is
    /// gone; neither case may fail the originating mutation.
    pub fn publish(&self, event: BoardEvent) {
        if let Some(sender) = self.topics.get(&event.board_id()) {
            let _ = sender.send(event);
        }
    }
}
