//! Rebuilds the transcript sent to the model from stored turns.
use anyhow::{Error, Result};
use tokio_rusqlite::Connection;

use super::db::recent_turns;
use super::models::Turn;
use crate::openai::{Message, Role};

/// Turns read back by the server when building a prompt.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Messages a client keeps on screen as context.
pub const CLIENT_CONTEXT_LIMIT: usize = 10;

/// Stored turns for a session plus the id of the newest one, used to
/// detect concurrent writes when the reply is saved.
#[derive(Debug, Default)]
pub struct History {
    pub turns: Vec<Turn>,
    pub last_turn_id: Option<i64>,
}

impl History {
    pub async fn load(
        db: &Connection,
        uid: &str,
        session_id: Option<&str>,
        limit: usize,
    ) -> Result<Self, Error> {
        // A session that doesn't exist yet has no history
        let Some(session_id) = session_id else {
            return Ok(Self::default());
        };
        let (turns, last_turn_id) = recent_turns(db, uid, session_id, limit).await?;
        Ok(Self {
            turns,
            last_turn_id,
        })
    }

    pub fn transcript(&self, new_message: &str) -> Vec<Message> {
        assemble_transcript(&self.turns, new_message)
    }
}

/// Map each stored turn into role tagged messages in order and append
/// the new user message. Turns missing a field contribute only the
/// field they have.
pub fn assemble_transcript(turns: &[Turn], new_message: &str) -> Vec<Message> {
    let mut transcript: Vec<Message> = turns
        .iter()
        .flat_map(Turn::transcript_messages)
        .collect();
    transcript.push(Message::new(Role::User, new_message));
    transcript
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::db::{insert_message, insert_turn_if_current};
    use crate::chat::models::Sender;
    use crate::core::db::memory_db;

    fn turn(id: i64, user_input: Option<&str>, reply: Option<&str>) -> Turn {
        Turn {
            id,
            uid: String::from("u1"),
            session_id: String::from("chat-1"),
            user_input: user_input.map(String::from),
            reply: reply.map(String::from),
            created_at: format!("2025-01-01T00:00:{:02}.000Z", id),
        }
    }

    #[test]
    fn test_assemble_transcript_example() {
        let turns = vec![turn(1, Some("hi"), Some("hello"))];
        let transcript = assemble_transcript(&turns, "how are you");
        assert_eq!(
            transcript,
            vec![
                Message::new(Role::User, "hi"),
                Message::new(Role::Assistant, "hello"),
                Message::new(Role::User, "how are you"),
            ]
        );
    }

    #[test]
    fn test_assemble_transcript_length() {
        let turns = (1..=7)
            .map(|i| turn(i, Some("q"), Some("a")))
            .collect::<Vec<_>>();
        assert_eq!(assemble_transcript(&turns, "next").len(), 2 * 7 + 1);
        assert_eq!(assemble_transcript(&[], "first").len(), 1);
    }

    #[test]
    fn test_assemble_transcript_partial_turns() {
        let turns = vec![
            turn(1, Some("are you there?"), None),
            turn(2, None, Some("I'm here.")),
        ];
        let transcript = assemble_transcript(&turns, "ok");
        assert_eq!(
            transcript,
            vec![
                Message::new(Role::User, "are you there?"),
                Message::new(Role::Assistant, "I'm here."),
                Message::new(Role::User, "ok"),
            ]
        );
    }

    #[tokio::test]
    async fn test_history_load_truncates_to_limit() {
        let db = memory_db().await.unwrap();
        let mut last = None;
        for i in 0..12 {
            last = insert_turn_if_current(
                &db,
                "u1",
                Some("chat-1"),
                &format!("q{}", i),
                &format!("a{}", i),
                last,
            )
            .await
            .unwrap()
            .map(|t| t.id);
        }
        insert_message(&db, "u1", "chat-1", Sender::User, "dangling")
            .await
            .unwrap();

        let history = History::load(&db, "u1", Some("chat-1"), CLIENT_CONTEXT_LIMIT)
            .await
            .unwrap();
        assert_eq!(history.turns.len(), CLIENT_CONTEXT_LIMIT);

        let transcript = history.transcript("new");
        // 9 full turns, one single field turn and the new message
        assert_eq!(transcript.len(), 9 * 2 + 1 + 1);
        assert_eq!(transcript[0], Message::new(Role::User, "q3"));
        assert_eq!(transcript[18], Message::new(Role::User, "dangling"));
        assert_eq!(transcript[19], Message::new(Role::User, "new"));
    }

    #[tokio::test]
    async fn test_history_load_without_session() {
        let db = memory_db().await.unwrap();
        let history = History::load(&db, "u1", None, DEFAULT_HISTORY_LIMIT)
            .await
            .unwrap();
        assert!(history.turns.is_empty());
        assert_eq!(history.last_turn_id, None);
    }
}
