//! Public types for the speech API
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscribeRequest {
    pub audio_url: Option<String>,
    pub uid: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TranscribeResponse {
    pub text: String,
}

#[derive(Deserialize)]
pub struct SpeakRequest {
    pub text: Option<String>,
    pub uid: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SpeakResponse {
    pub audio_url: String,
}

/// Transcribe, reply and speak the reply in one call
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioChatRequest {
    pub audio_url: Option<String>,
    pub uid: Option<String>,
    pub did: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AudioChatResponse {
    pub text: String,
    pub reply: String,
    pub audio_url: String,
    pub did: String,
}

/// Metadata stored for every call to the speech API
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaCall {
    pub id: i64,
    pub kind: String,
    pub uid: Option<String>,
    pub input: String,
    pub output: String,
    pub created_at: String,
}
