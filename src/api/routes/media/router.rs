//! Router for speech to text and text to speech

use std::path::Path;
use std::sync::{Arc, RwLock};

use anyhow::{Error, Result};
use axum::{Json, Router, extract::State, routing::post};
use tokio_rusqlite::Connection;
use uuid::Uuid;

use super::db::{MediaKind, insert_media_call};
use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::api::utils::{optional, required};
use crate::chat::Chat;
use crate::openai::{OpenAiClient, fetch_audio, speech, transcription};

type SharedState = Arc<RwLock<AppState>>;

/// Public path synthesized audio is served from
const MEDIA_URL_PREFIX: &str = "/media";

async fn transcribe_url(
    db: &Connection,
    openai: &OpenAiClient,
    uid: Option<&str>,
    audio_url: &str,
) -> Result<String, Error> {
    let (audio, file_name) = fetch_audio(openai, audio_url).await?;
    let text = transcription(openai, audio, &file_name).await?;
    insert_media_call(db, MediaKind::Transcription, uid, audio_url, &text).await?;
    Ok(text)
}

/// Synthesize `text`, store the mp3 under `media_path` and return the
/// url it's served from.
async fn speak_text(
    db: &Connection,
    openai: &OpenAiClient,
    media_path: &str,
    uid: Option<&str>,
    text: &str,
) -> Result<String, Error> {
    let audio = speech(openai, text).await?;

    let file_name = format!("{}.mp3", Uuid::new_v4());
    tokio::fs::create_dir_all(media_path).await?;
    tokio::fs::write(Path::new(media_path).join(&file_name), audio).await?;

    let audio_url = format!("{}/{}", MEDIA_URL_PREFIX, file_name);
    insert_media_call(db, MediaKind::Speech, uid, text, &audio_url).await?;
    Ok(audio_url)
}

/// Transcribe the audio file at `audioUrl`
async fn transcribe(
    State(state): State<SharedState>,
    Json(payload): Json<public::TranscribeRequest>,
) -> Result<Json<public::TranscribeResponse>, ApiError> {
    let audio_url = required(payload.audio_url, "Missing audio URL")?;
    let uid = optional(payload.uid);
    let (db, openai) = {
        let shared_state = state.read().expect("Unable to read share state");
        (shared_state.db.clone(), shared_state.openai.clone())
    };

    let text = transcribe_url(&db, &openai, uid.as_deref(), &audio_url).await?;

    Ok(Json(public::TranscribeResponse { text }))
}

/// Turn `text` into speech
async fn speak(
    State(state): State<SharedState>,
    Json(payload): Json<public::SpeakRequest>,
) -> Result<Json<public::SpeakResponse>, ApiError> {
    let text = required(payload.text, "Missing text")?;
    let uid = optional(payload.uid);
    let (db, openai, media_path) = {
        let shared_state = state.read().expect("Unable to read share state");
        (
            shared_state.db.clone(),
            shared_state.openai.clone(),
            shared_state.config.media_path.clone(),
        )
    };

    let audio_url = speak_text(&db, &openai, &media_path, uid.as_deref(), &text).await?;

    Ok(Json(public::SpeakResponse { audio_url }))
}

/// Voice round trip: transcribe the recording, get a reply in the
/// session and speak it back
async fn audio_chat(
    State(state): State<SharedState>,
    Json(payload): Json<public::AudioChatRequest>,
) -> Result<Json<public::AudioChatResponse>, ApiError> {
    let uid = required(payload.uid, "Missing user ID")?;
    let audio_url = required(payload.audio_url, "Missing audio URL")?;
    let did = optional(payload.did);
    let (db, openai, media_path, system_message, history_limit) = {
        let shared_state = state.read().expect("Unable to read share state");
        (
            shared_state.db.clone(),
            shared_state.openai.clone(),
            shared_state.config.media_path.clone(),
            shared_state.config.system_message.clone(),
            shared_state.config.history_limit,
        )
    };

    let text = transcribe_url(&db, &openai, Some(&uid), &audio_url).await?;
    if text.trim().is_empty() {
        return Err(ApiError::bad_request("No speech found in audio"));
    }

    let turn = Chat::new(&db, &openai, &system_message, history_limit)
        .next_turn(&uid, did.as_deref(), &text)
        .await?;
    state
        .read()
        .expect("Unable to read share state")
        .publish_turn(&turn);

    let reply = turn.reply.unwrap_or_default();
    let audio_url = speak_text(&db, &openai, &media_path, Some(&uid), &reply).await?;

    Ok(Json(public::AudioChatResponse {
        text,
        reply,
        audio_url,
        did: turn.session_id,
    }))
}

/// Create the media router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/transcribe", post(transcribe))
        .route("/speak", post(speak))
        .route("/audio-chat", post(audio_chat))
}
