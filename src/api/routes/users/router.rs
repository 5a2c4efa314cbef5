//! Router for the users API

use std::sync::{Arc, RwLock};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use super::db::{find_user, insert_user};
use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::api::utils::{optional, required};

type SharedState = Arc<RwLock<AppState>>;

/// Store the profile of a user that just signed up
async fn create_user(
    State(state): State<SharedState>,
    Json(payload): Json<public::CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = required(payload.uid, "Missing user ID")?;
    let name = optional(payload.name);
    let email = optional(payload.email);
    let db = state.read().expect("Unable to read share state").db.clone();

    let user = insert_user(&db, &uid, name.as_deref(), email.as_deref())
        .await?
        .ok_or_else(|| ApiError::conflict(&format!("User {} already exists", uid)))?;

    Ok((StatusCode::CREATED, Json(user)))
}

async fn get_user(
    State(state): State<SharedState>,
    Path(uid): Path<String>,
) -> Result<Json<public::User>, ApiError> {
    let db = state.read().expect("Unable to read share state").db.clone();

    let user = find_user(&db, &uid)
        .await?
        .ok_or_else(|| ApiError::not_found(&format!("User {} not found", uid)))?;

    Ok(Json(user))
}

/// Create the users router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/{uid}", get(get_user))
}
