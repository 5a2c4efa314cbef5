use anyhow::{Error, Result};
use rusqlite::{OptionalExtension, params};
use tokio_rusqlite::Connection;

use super::public::User;

/// Insert a user profile. Profiles are read-only once created so an
/// existing uid returns `None` and leaves the stored profile as is.
pub async fn insert_user(
    db: &Connection,
    uid: &str,
    name: Option<&str>,
    email: Option<&str>,
) -> Result<Option<User>, Error> {
    let uid = uid.to_owned();
    let name = name.map(str::to_string);
    let email = email.map(str::to_string);
    let user = db
        .call(move |conn| {
            let user = conn
                .query_row(
                    r#"
                    INSERT INTO user_profile (uid, name, email) VALUES (?, ?, ?)
                    ON CONFLICT (uid) DO NOTHING
                    RETURNING uid, name, email, created_at
                    "#,
                    params![uid, name, email],
                    |row| {
                        Ok(User {
                            uid: row.get(0)?,
                            name: row.get(1)?,
                            email: row.get(2)?,
                            created_at: row.get(3)?,
                        })
                    },
                )
                .optional()?;
            Ok(user)
        })
        .await?;
    Ok(user)
}

pub async fn find_user(db: &Connection, uid: &str) -> Result<Option<User>, Error> {
    let uid = uid.to_owned();
    let user = db
        .call(move |conn| {
            let user = conn
                .query_row(
                    "SELECT uid, name, email, created_at FROM user_profile WHERE uid = ?",
                    [uid],
                    |row| {
                        Ok(User {
                            uid: row.get(0)?,
                            name: row.get(1)?,
                            email: row.get(2)?,
                            created_at: row.get(3)?,
                        })
                    },
                )
                .optional()?;
            Ok(user)
        })
        .await?;
    Ok(user)
}
