//! API routes module

pub mod chat;
pub mod media;
pub mod sessions;
pub mod users;

use std::sync::{Arc, RwLock};

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<RwLock<AppState>>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Chat routes
        .merge(chat::router())
        // Session listing and message routes
        .merge(sessions::router())
        // Transcription and speech routes
        .merge(media::router())
        // User profile routes
        .merge(users::router())
}
