//! Router for listing sessions and reading their messages

use std::convert::Infallible;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, sse::Event, sse::KeepAlive, sse::Sse},
    routing::{get, post},
};
use axum_extra::extract::Query;
use tokio_stream::StreamExt as _;
use tokio_stream::wrappers::BroadcastStream;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::api::utils::{optional, paginate, required};
use crate::chat::db::{create_session, find_turns, insert_message, list_sessions};
use crate::chat::{ChatMessage, Sender};

type SharedState = Arc<RwLock<AppState>>;

/// Start a new chat session for a user
async fn new_chat(
    State(state): State<SharedState>,
    Json(payload): Json<public::NewChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = required(payload.uid, "Missing user ID")?;
    let title = optional(payload.title);
    let db = state.read().expect("Unable to read share state").db.clone();

    let session = create_session(&db, &uid, title.as_deref()).await?;
    tracing::info!("Created session {} for {}", session.id, uid);

    Ok((StatusCode::CREATED, Json(session)))
}

/// List a user's chat sessions, most recent first
async fn list_chats(
    State(state): State<SharedState>,
    Path(uid): Path<String>,
    Query(params): Query<public::PageQuery>,
) -> Result<Json<Vec<public::ChatSession>>, ApiError> {
    let uid = required(Some(uid), "Missing user ID")?;
    let db = state.read().expect("Unable to read share state").db.clone();

    let sessions = list_sessions(&db, &uid).await?;

    Ok(Json(paginate(sessions, params.page, params.limit)))
}

/// Get the messages of a session in the order they were written
async fn chat_messages(
    State(state): State<SharedState>,
    Path((uid, chat_id)): Path<(String, String)>,
    Query(params): Query<public::PageQuery>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let uid = required(Some(uid), "Missing user ID")?;
    let chat_id = required(Some(chat_id), "Missing chat ID")?;
    let db = state.read().expect("Unable to read share state").db.clone();

    let messages = find_turns(&db, &uid, &chat_id)
        .await?
        .iter()
        .flat_map(|turn| turn.chat_messages())
        .collect::<Vec<_>>();

    Ok(Json(paginate(messages, params.page, params.limit)))
}

/// Append a single message to a session without asking the model
async fn add_chat_message(
    State(state): State<SharedState>,
    Path((uid, chat_id)): Path<(String, String)>,
    Json(payload): Json<public::MessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = required(Some(uid), "Missing user ID")?;
    let chat_id = required(Some(chat_id), "Missing chat ID")?;
    let text = required(payload.text, "Missing message text")?;
    let sender = Sender::parse(&required(payload.sender, "Missing sender")?);
    let db = state.read().expect("Unable to read share state").db.clone();

    let turn = insert_message(&db, &uid, &chat_id, sender, &text).await?;
    state
        .read()
        .expect("Unable to read share state")
        .publish_turn(&turn);

    let message = turn
        .chat_messages()
        .pop()
        .ok_or_else(|| anyhow::anyhow!("Stored turn {} has no message", turn.id))?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// Stream every turn written to a session after subscribing
async fn chat_events(
    State(state): State<SharedState>,
    Path((uid, chat_id)): Path<(String, String)>,
) -> impl IntoResponse {
    let rx = state
        .read()
        .expect("Unable to read share state")
        .turn_events
        .subscribe();

    let stream = BroadcastStream::new(rx)
        .filter_map(move |event| match event {
            Ok(turn) if turn.uid == uid && turn.session_id == chat_id => Some(turn),
            Ok(_) => None,
            Err(err) => {
                tracing::warn!("Turn subscriber fell behind: {}", err);
                None
            }
        })
        .map(|turn| {
            let data = serde_json::to_string(&turn.chat_messages()).unwrap_or_default();
            Ok::<Event, Infallible>(Event::default().event("turn").data(data))
        });

    Sse::new(stream).keep_alive(
        KeepAlive::default()
            .text("keep-alive")
            .interval(Duration::from_secs(15)),
    )
}

/// Create the sessions router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/new-chat", post(new_chat))
        .route("/list-chats/{uid}", get(list_chats))
        .route(
            "/chat-messages/{uid}/{chat_id}",
            get(chat_messages).post(add_chat_message),
        )
        .route("/chat-messages/{uid}/{chat_id}/events", get(chat_events))
}
