use anyhow::{Error, Result};
use chrono::Utc;
use rusqlite::{OptionalExtension, Row, Transaction, params};
use tokio_rusqlite::Connection;

use super::models::{ChatSession, Sender, Turn};

const SESSION_ID_PREFIX: &str = "chat-";
const SESSION_KIND: &str = "chat";

/// Numeric suffix of a `chat-<n>` session id. Ids that don't follow
/// the convention sort as 0.
pub fn session_suffix(session_id: &str) -> u64 {
    session_id
        .strip_prefix(SESSION_ID_PREFIX)
        .and_then(|suffix| suffix.parse::<u64>().ok())
        .unwrap_or(0)
}

fn turn_from_row(row: &Row) -> rusqlite::Result<Turn> {
    Ok(Turn {
        id: row.get(0)?,
        uid: row.get(1)?,
        session_id: row.get(2)?,
        user_input: row.get(3)?,
        reply: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn session_from_row(row: &Row) -> rusqlite::Result<ChatSession> {
    Ok(ChatSession {
        id: row.get(0)?,
        title: row.get(1)?,
        created_at: row.get(2)?,
    })
}

/// Insert a new session with a unique `chat-<millis>` id. The title
/// defaults to "Session N" where N counts the user's sessions.
fn allocate_session(
    tx: &Transaction,
    uid: &str,
    title: Option<&str>,
) -> rusqlite::Result<ChatSession> {
    let count: i64 = tx.query_row(
        "SELECT COUNT(*) FROM session WHERE uid = ?",
        [uid],
        |row| row.get(0),
    )?;
    let title = title
        .map(str::to_string)
        .unwrap_or_else(|| format!("Session {}", count + 1));

    // Bump the suffix until it's free so ids stay unique within the
    // same millisecond
    let mut suffix = Utc::now().timestamp_millis();
    loop {
        let id = format!("{}{}", SESSION_ID_PREFIX, suffix);
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO session (uid, id, kind, title) VALUES (?, ?, ?, ?)",
            params![uid, id, SESSION_KIND, title],
        )?;
        if inserted == 1 {
            return tx.query_row(
                "SELECT id, title, created_at FROM session WHERE uid = ? AND id = ?",
                params![uid, id],
                session_from_row,
            );
        }
        suffix += 1;
    }
}

/// Resolve the session a turn is written to, creating it when needed.
fn ensure_session(
    tx: &Transaction,
    uid: &str,
    session_id: Option<&str>,
) -> rusqlite::Result<String> {
    match session_id {
        Some(id) => {
            tx.execute(
                "INSERT OR IGNORE INTO session (uid, id, kind) VALUES (?, ?, ?)",
                params![uid, id, SESSION_KIND],
            )?;
            Ok(id.to_string())
        }
        None => Ok(allocate_session(tx, uid, None)?.id),
    }
}

fn latest_turn_id(tx: &Transaction, uid: &str, session_id: &str) -> rusqlite::Result<Option<i64>> {
    tx.query_row(
        "SELECT MAX(id) FROM turn WHERE uid = ? AND session_id = ?",
        params![uid, session_id],
        |row| row.get(0),
    )
}

fn insert_turn(
    tx: &Transaction,
    uid: &str,
    session_id: &str,
    user_input: Option<&str>,
    reply: Option<&str>,
) -> rusqlite::Result<Turn> {
    tx.query_row(
        r#"
        INSERT INTO turn (uid, session_id, user_input, reply)
        VALUES (?, ?, ?, ?)
        RETURNING id, uid, session_id, user_input, reply, created_at
        "#,
        params![uid, session_id, user_input, reply],
        turn_from_row,
    )
}

pub async fn create_session(
    db: &Connection,
    uid: &str,
    title: Option<&str>,
) -> Result<ChatSession, Error> {
    let uid = uid.to_owned();
    let title = title.map(str::to_string);
    let session = db
        .call(move |conn| {
            let tx = conn.transaction()?;
            let session = allocate_session(&tx, &uid, title.as_deref())?;
            tx.commit()?;
            Ok(session)
        })
        .await?;
    Ok(session)
}

/// All of a user's chat sessions, newest suffix first. Sessions with
/// the same suffix fall back to creation time.
pub async fn list_sessions(db: &Connection, uid: &str) -> Result<Vec<ChatSession>, Error> {
    let uid = uid.to_owned();
    let mut sessions = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, created_at FROM session WHERE uid = ? AND kind = ?",
            )?;
            let rows = stmt
                .query_map(params![uid, SESSION_KIND], session_from_row)?
                .filter_map(Result::ok)
                .collect::<Vec<ChatSession>>();
            Ok(rows)
        })
        .await?;

    sessions.sort_by(|a, b| {
        session_suffix(&b.id)
            .cmp(&session_suffix(&a.id))
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    Ok(sessions)
}

pub async fn find_session(
    db: &Connection,
    uid: &str,
    session_id: &str,
) -> Result<Option<ChatSession>, Error> {
    let uid = uid.to_owned();
    let session_id = session_id.to_owned();
    let session = db
        .call(move |conn| {
            let session = conn
                .query_row(
                    "SELECT id, title, created_at FROM session WHERE uid = ? AND id = ?",
                    params![uid, session_id],
                    session_from_row,
                )
                .optional()?;
            Ok(session)
        })
        .await?;
    Ok(session)
}

/// The most recent `limit` turns in ascending order along with the id
/// of the newest turn in the session.
pub async fn recent_turns(
    db: &Connection,
    uid: &str,
    session_id: &str,
    limit: usize,
) -> Result<(Vec<Turn>, Option<i64>), Error> {
    let uid = uid.to_owned();
    let session_id = session_id.to_owned();
    let result = db
        .call(move |conn| {
            let tx = conn.transaction()?;
            let latest = latest_turn_id(&tx, &uid, &session_id)?;
            let mut turns = {
                let mut stmt = tx.prepare(
                    r#"
                    SELECT id, uid, session_id, user_input, reply, created_at
                    FROM turn
                    WHERE uid = ? AND session_id = ?
                    ORDER BY created_at DESC, id DESC
                    LIMIT ?
                    "#,
                )?;
                let rows = stmt
                    .query_map(params![uid, session_id, limit as i64], turn_from_row)?
                    .filter_map(Result::ok)
                    .collect::<Vec<Turn>>();
                rows
            };
            tx.commit()?;
            turns.reverse();
            Ok((turns, latest))
        })
        .await?;
    Ok(result)
}

/// Every turn in a session in ascending order.
pub async fn find_turns(db: &Connection, uid: &str, session_id: &str) -> Result<Vec<Turn>, Error> {
    let uid = uid.to_owned();
    let session_id = session_id.to_owned();
    let turns = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT id, uid, session_id, user_input, reply, created_at
                FROM turn
                WHERE uid = ? AND session_id = ?
                ORDER BY created_at ASC, id ASC
                "#,
            )?;
            let rows = stmt
                .query_map(params![uid, session_id], turn_from_row)?
                .filter_map(Result::ok)
                .collect::<Vec<Turn>>();
            Ok(rows)
        })
        .await?;
    Ok(turns)
}

/// Write a completed turn unless the session has moved past
/// `last_seen_turn_id`. Returns `None` when the write was refused.
/// When `session_id` is `None` a new session is allocated.
pub async fn insert_turn_if_current(
    db: &Connection,
    uid: &str,
    session_id: Option<&str>,
    user_input: &str,
    reply: &str,
    last_seen_turn_id: Option<i64>,
) -> Result<Option<Turn>, Error> {
    let uid = uid.to_owned();
    let session_id = session_id.map(str::to_string);
    let user_input = user_input.to_owned();
    let reply = reply.to_owned();
    let turn = db
        .call(move |conn| {
            let tx = conn.transaction()?;
            let session_id = ensure_session(&tx, &uid, session_id.as_deref())?;
            if latest_turn_id(&tx, &uid, &session_id)? != last_seen_turn_id {
                // Dropping the transaction rolls back the session insert
                return Ok(None);
            }
            let turn = insert_turn(&tx, &uid, &session_id, Some(&user_input), Some(&reply))?;
            tx.commit()?;
            Ok(Some(turn))
        })
        .await?;
    Ok(turn)
}

/// Append a single message to a session without any history check.
pub async fn insert_message(
    db: &Connection,
    uid: &str,
    session_id: &str,
    sender: Sender,
    text: &str,
) -> Result<Turn, Error> {
    let uid = uid.to_owned();
    let session_id = session_id.to_owned();
    let text = text.to_owned();
    let turn = db
        .call(move |conn| {
            let tx = conn.transaction()?;
            ensure_session(&tx, &uid, Some(&session_id))?;
            let turn = match sender {
                Sender::User => insert_turn(&tx, &uid, &session_id, Some(&text), None)?,
                Sender::Ai => insert_turn(&tx, &uid, &session_id, None, Some(&text))?,
            };
            tx.commit()?;
            Ok(turn)
        })
        .await?;
    Ok(turn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::memory_db;

    #[test]
    fn test_session_suffix() {
        assert_eq!(session_suffix("chat-1700000000000"), 1700000000000);
        assert_eq!(session_suffix("chat-"), 0);
        assert_eq!(session_suffix("chat-abc"), 0);
        assert_eq!(session_suffix("abc123"), 0);
        assert_eq!(session_suffix("session-42"), 0);
    }

    #[tokio::test]
    async fn test_create_session_titles_and_ids() {
        let db = memory_db().await.unwrap();
        let first = create_session(&db, "u1", None).await.unwrap();
        let second = create_session(&db, "u1", None).await.unwrap();
        let named = create_session(&db, "u1", Some("Sleep")).await.unwrap();

        assert_eq!(first.title.as_deref(), Some("Session 1"));
        assert_eq!(second.title.as_deref(), Some("Session 2"));
        assert_eq!(named.title.as_deref(), Some("Sleep"));
        assert!(first.id.starts_with("chat-"));
        assert_ne!(first.id, second.id);
        assert_ne!(second.id, named.id);
    }

    #[tokio::test]
    async fn test_list_sessions_sorts_by_suffix_desc() {
        let db = memory_db().await.unwrap();
        for id in ["chat-5", "legacy", "chat-20", "chat-oops", "chat-7"] {
            insert_message(&db, "u1", id, Sender::User, "hi").await.unwrap();
        }
        insert_message(&db, "someone-else", "chat-99", Sender::User, "hi")
            .await
            .unwrap();

        let ids = list_sessions(&db, "u1")
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect::<Vec<_>>();

        assert_eq!(&ids[..3], &["chat-20", "chat-7", "chat-5"]);
        assert_eq!(ids.len(), 5);
        assert!(ids[3..].contains(&String::from("legacy")));
        assert!(ids[3..].contains(&String::from("chat-oops")));
    }

    #[tokio::test]
    async fn test_recent_turns_returns_latest_ascending() {
        let db = memory_db().await.unwrap();
        let mut last = None;
        for i in 0..25 {
            let turn = insert_turn_if_current(
                &db,
                "u1",
                Some("chat-1"),
                &format!("q{}", i),
                &format!("a{}", i),
                last,
            )
            .await
            .unwrap()
            .expect("turn should be written");
            last = Some(turn.id);
        }

        let (turns, latest) = recent_turns(&db, "u1", "chat-1", 20).await.unwrap();
        assert_eq!(turns.len(), 20);
        assert_eq!(turns[0].user_input.as_deref(), Some("q5"));
        assert_eq!(turns[19].user_input.as_deref(), Some("q24"));
        assert_eq!(latest, last);
    }

    #[tokio::test]
    async fn test_insert_refused_when_history_moved() {
        let db = memory_db().await.unwrap();
        let (_, seen) = recent_turns(&db, "u1", "chat-1", 20).await.unwrap();
        assert_eq!(seen, None);

        // A concurrent send lands first
        insert_turn_if_current(&db, "u1", Some("chat-1"), "first", "reply", seen)
            .await
            .unwrap()
            .unwrap();

        let refused = insert_turn_if_current(&db, "u1", Some("chat-1"), "second", "reply", seen)
            .await
            .unwrap();
        assert!(refused.is_none());
        assert_eq!(find_turns(&db, "u1", "chat-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_insert_without_session_allocates_one() {
        let db = memory_db().await.unwrap();
        let turn = insert_turn_if_current(&db, "u1", None, "hi", "hello", None)
            .await
            .unwrap()
            .unwrap();

        assert!(turn.session_id.starts_with("chat-"));
        let session = find_session(&db, "u1", &turn.session_id).await.unwrap().unwrap();
        assert_eq!(session.title.as_deref(), Some("Session 1"));
    }

    #[tokio::test]
    async fn test_insert_message_single_field() {
        let db = memory_db().await.unwrap();
        let turn = insert_message(&db, "u1", "chat-1", Sender::Ai, "hello")
            .await
            .unwrap();
        assert_eq!(turn.user_input, None);
        assert_eq!(turn.reply.as_deref(), Some("hello"));
        assert!(find_session(&db, "u1", "chat-1").await.unwrap().is_some());
        assert!(find_session(&db, "u2", "chat-1").await.unwrap().is_none());
    }
}
