use anyhow::Result;
use std::fs;

use crate::core::AppConfig;
use crate::core::db::{async_db, initialize_db};

/// Create the storage directories and the database schema
pub async fn run(config: &AppConfig) -> Result<()> {
    println!("Initializing storage in {}...", config.storage_path);
    fs::create_dir_all(&config.storage_path)?;
    fs::create_dir_all(&config.media_path)?;

    let db = async_db(&config.db_path).await?;
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await?;
    println!("Finished initializing db at {}", config.db_path);

    Ok(())
}
