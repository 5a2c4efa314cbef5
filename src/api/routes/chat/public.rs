//! Public types for the chat API
use serde::{Deserialize, Serialize};

/// `did` is the session id. Without one a new session is started.
#[derive(Deserialize)]
pub struct ChatRequest {
    pub text: Option<String>,
    pub uid: Option<String>,
    pub did: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ChatResponse {
    pub reply: String,
    pub did: String,
}
