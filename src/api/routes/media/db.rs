use anyhow::{Error, Result};
use rusqlite::params;
use tokio_rusqlite::Connection;

use super::public::MediaCall;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaKind {
    Transcription,
    Speech,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Transcription => "transcription",
            MediaKind::Speech => "speech",
        }
    }
}

pub async fn insert_media_call(
    db: &Connection,
    kind: MediaKind,
    uid: Option<&str>,
    input: &str,
    output: &str,
) -> Result<i64, Error> {
    let uid = uid.map(str::to_string);
    let input = input.to_owned();
    let output = output.to_owned();
    let id = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "INSERT INTO media_call (kind, uid, input, output) VALUES (?, ?, ?, ?)",
            )?;
            let id = stmt.insert(params![kind.as_str(), uid, input, output])?;
            Ok(id)
        })
        .await?;
    Ok(id)
}

pub async fn find_media_calls(db: &Connection, kind: MediaKind) -> Result<Vec<MediaCall>, Error> {
    let calls = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, kind, uid, input, output, created_at FROM media_call WHERE kind = ? ORDER BY id",
            )?;
            let rows = stmt
                .query_map([kind.as_str()], |row| {
                    Ok(MediaCall {
                        id: row.get(0)?,
                        kind: row.get(1)?,
                        uid: row.get(2)?,
                        input: row.get(3)?,
                        output: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                })?
                .filter_map(Result::ok)
                .collect::<Vec<MediaCall>>();
            Ok(rows)
        })
        .await?;
    Ok(calls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::memory_db;

    #[tokio::test]
    async fn test_insert_and_find_media_calls() {
        let db = memory_db().await.unwrap();
        insert_media_call(&db, MediaKind::Speech, Some("u1"), "hello", "/media/a.mp3")
            .await
            .unwrap();
        insert_media_call(&db, MediaKind::Transcription, None, "http://x/a.wav", "hello")
            .await
            .unwrap();

        let speech = find_media_calls(&db, MediaKind::Speech).await.unwrap();
        assert_eq!(speech.len(), 1);
        assert_eq!(speech[0].uid.as_deref(), Some("u1"));
        assert_eq!(speech[0].output, "/media/a.mp3");

        let transcriptions = find_media_calls(&db, MediaKind::Transcription).await.unwrap();
        assert_eq!(transcriptions.len(), 1);
        assert_eq!(transcriptions[0].uid, None);
    }
}
