//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;

use crate::chat::ChatError;

// Errors

pub enum ApiError {
    /// A required identifier or field is missing
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn bad_request(msg: &str) -> Self {
        Self::BadRequest(msg.to_string())
    }

    pub fn not_found(msg: &str) -> Self {
        Self::NotFound(msg.to_string())
    }

    pub fn conflict(msg: &str) -> Self {
        Self::Conflict(msg.to_string())
    }
}

/// Convert `ApiError` into an Axum compatible response with a JSON
/// `{"error": ...}` body.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => {
                tracing::warn!("{}", msg);
                (StatusCode::CONFLICT, msg)
            }
            ApiError::Internal(err) => {
                // Always log the error, the client only gets a generic message
                tracing::error!("{}. Root cause: {}", err, err.root_cause());
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    String::from("Something went wrong"),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`. Chat
/// errors that map onto a status code keep it.
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        if let Some(ChatError::HistoryChanged { .. }) = err.downcast_ref::<ChatError>() {
            return Self::Conflict(err.to_string());
        }
        Self::Internal(err)
    }
}

// Re-export public types from each route

pub mod chat {
    pub use crate::api::routes::chat::public::*;
}

pub mod media {
    pub use crate::api::routes::media::public::*;
}

pub mod sessions {
    pub use crate::api::routes::sessions::public::*;
}

pub mod users {
    pub use crate::api::routes::users::public::*;
}
