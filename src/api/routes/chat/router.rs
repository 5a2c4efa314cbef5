//! Router for the chat API

use std::sync::{Arc, RwLock};

use axum::{Json, Router, extract::State, routing::post};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::api::utils::{optional, required};
use crate::chat::Chat;

type SharedState = Arc<RwLock<AppState>>;

/// Send a message and wait for the assistant's reply. The exchange is
/// stored as one turn in the session.
async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<public::ChatRequest>,
) -> Result<Json<public::ChatResponse>, ApiError> {
    let uid = required(payload.uid, "Missing user ID")?;
    let text = required(payload.text, "Missing message text")?;
    let did = optional(payload.did);

    let (db, openai, system_message, history_limit) = {
        let shared_state = state.read().expect("Unable to read share state");
        (
            shared_state.db.clone(),
            shared_state.openai.clone(),
            shared_state.config.system_message.clone(),
            shared_state.config.history_limit,
        )
    };

    let turn = Chat::new(&db, &openai, &system_message, history_limit)
        .next_turn(&uid, did.as_deref(), &text)
        .await?;

    state
        .read()
        .expect("Unable to read share state")
        .publish_turn(&turn);

    Ok(Json(public::ChatResponse {
        reply: turn.reply.unwrap_or_default(),
        did: turn.session_id,
    }))
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/ai", post(chat_handler))
        .route("/chat", post(chat_handler))
}
