//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, RwLock};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio_rusqlite::Connection;
use tower::util::ServiceExt;

use hestia::api::AppState;
use hestia::api::app;
use hestia::core::AppConfig;
use hestia::core::db::{async_db, initialize_db};

pub const SYSTEM_MESSAGE: &str = "You are a kind assistant.";

/// A running app backed by a temporary storage directory. The
/// directory is removed when this is dropped.
pub struct TestApp {
    pub router: Router,
    pub db: Connection,
    pub config: AppConfig,
    _storage: TempDir,
}

/// Creates a test application that sends model requests to
/// `openai_api_hostname`, usually a `mockito` server.
pub async fn test_app(openai_api_hostname: &str) -> TestApp {
    test_app_with_config(openai_api_hostname, |_| {}).await
}

pub async fn test_app_with_config(
    openai_api_hostname: &str,
    configure: impl FnOnce(&mut AppConfig),
) -> TestApp {
    let storage = tempfile::tempdir().expect("Failed to create temp dir");
    let storage_path = storage.path().display().to_string();
    let media_path = storage.path().join("media");
    std::fs::create_dir_all(&media_path).expect("Failed to create media directory");

    let mut config = AppConfig {
        db_path: format!("{}/hestia.db", storage_path),
        media_path: media_path.display().to_string(),
        storage_path,
        openai_model: String::from("gpt-4o-mini"),
        openai_api_hostname: openai_api_hostname.to_string(),
        openai_api_key: String::from("test-api-key"),
        transcription_model: String::from("whisper-1"),
        speech_model: String::from("tts-1"),
        speech_voice: String::from("nova"),
        system_message: String::from(SYSTEM_MESSAGE),
        history_limit: 20,
    };
    configure(&mut config);

    let db = async_db(&config.db_path)
        .await
        .expect("Failed to connect to async db");
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await
    .expect("Failed to initialize db");

    let app_state = AppState::new(db.clone(), config.clone());
    TestApp {
        router: app(Arc::new(RwLock::new(app_state))),
        db,
        config,
        _storage: storage,
    }
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not utf8")
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = body_to_string(response.into_body()).await;
    let value = serde_json::from_str(&body).unwrap_or(Value::Null);
    (status, value)
}

pub async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(
        router,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

pub async fn post_json(router: &Router, uri: &str, payload: Value) -> (StatusCode, Value) {
    send(
        router,
        Request::builder()
            .uri(uri)
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap(),
    )
    .await
}

/// A non-streaming chat completion response with `content`
pub fn completion_body(content: &str) -> String {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1694268190,
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

/// Number of stored turns across every session
pub async fn turn_count(db: &Connection) -> i64 {
    db.call(|conn| {
        let count = conn.query_row("SELECT COUNT(*) FROM turn", [], |row| row.get(0))?;
        Ok(count)
    })
    .await
    .unwrap()
}

/// Number of stored sessions across every user
pub async fn session_count(db: &Connection) -> i64 {
    db.call(|conn| {
        let count = conn.query_row("SELECT COUNT(*) FROM session", [], |row| row.get(0))?;
        Ok(count)
    })
    .await
    .unwrap()
}
