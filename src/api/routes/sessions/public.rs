//! Public types for the sessions API
use serde::Deserialize;

pub use crate::chat::{ChatMessage, ChatSession, Sender};

#[derive(Deserialize)]
pub struct NewChatRequest {
    pub uid: Option<String>,
    pub title: Option<String>,
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// Append a single message to a thread
#[derive(Deserialize)]
pub struct MessageRequest {
    pub sender: Option<String>,
    pub text: Option<String>,
}
