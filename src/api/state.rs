use tokio::sync::broadcast;
use tokio_rusqlite::Connection;

use crate::chat::Turn;
use crate::core::AppConfig;
use crate::openai::OpenAiClient;

// Pending turn events per subscriber before it starts lagging
const TURN_EVENT_CAPACITY: usize = 256;

pub struct AppState {
    pub db: Connection,
    pub config: AppConfig,
    pub openai: OpenAiClient,
    // Every stored turn is published here for live subscribers
    pub turn_events: broadcast::Sender<Turn>,
}

impl AppState {
    pub fn new(db: Connection, config: AppConfig) -> Self {
        let openai = OpenAiClient::from_config(&config);
        let (turn_events, _) = broadcast::channel(TURN_EVENT_CAPACITY);
        Self {
            db,
            config,
            openai,
            turn_events,
        }
    }

    /// Notify subscribers of a new turn. Nobody listening is fine.
    pub fn publish_turn(&self, turn: &Turn) {
        let _ = self.turn_events.send(turn.clone());
    }
}
