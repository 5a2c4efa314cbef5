use anyhow::{Error, Result};
use tokio_rusqlite::Connection;

use super::db::insert_turn_if_current;
use super::error::ChatError;
use super::history::History;
use super::models::Turn;
use crate::openai::{OpenAiClient, chat};

/// Runs a user's message through the model and records the exchange.
///
/// Each turn reads the recent history of the session, asks the model
/// for a reply with the system message prepended, then writes the
/// input and reply as one record. The write is refused with
/// `ChatError::HistoryChanged` when another turn was stored in the
/// meantime.
pub struct Chat<'a> {
    db: &'a Connection,
    client: &'a OpenAiClient,
    system_message: &'a str,
    history_limit: usize,
}

impl<'a> Chat<'a> {
    pub fn new(
        db: &'a Connection,
        client: &'a OpenAiClient,
        system_message: &'a str,
        history_limit: usize,
    ) -> Self {
        Self {
            db,
            client,
            system_message,
            history_limit,
        }
    }

    /// Send `text` in `session_id`, or in a freshly allocated session
    /// when no id is given. Returns the stored turn.
    pub async fn next_turn(
        &self,
        uid: &str,
        session_id: Option<&str>,
        text: &str,
    ) -> Result<Turn, Error> {
        let history = History::load(self.db, uid, session_id, self.history_limit).await?;
        let transcript = history.transcript(text);

        tracing::debug!(
            "Requesting reply for uid={} session={:?} with {} messages",
            uid,
            session_id,
            transcript.len()
        );
        let reply = chat(self.client, self.system_message, &transcript).await?;

        let turn = insert_turn_if_current(
            self.db,
            uid,
            session_id,
            text,
            &reply,
            history.last_turn_id,
        )
        .await?
        .ok_or_else(|| ChatError::HistoryChanged {
            session_id: session_id.unwrap_or_default().to_string(),
        })?;

        Ok(turn)
    }
}
