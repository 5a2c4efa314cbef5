use std::time::Duration;

use anyhow::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::core::AppConfig;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Message {
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: Some(content.to_string()),
        }
    }
}

/// Connection details for an OpenAI compatible API. Built once from
/// `AppConfig` and shared by every handler.
#[derive(Clone, Debug)]
pub struct OpenAiClient {
    http: reqwest::Client,
    pub api_hostname: String,
    api_key: String,
    pub model: String,
    pub transcription_model: String,
    pub speech_model: String,
    pub speech_voice: String,
}

impl OpenAiClient {
    pub fn new(api_hostname: &str, api_key: &str, model: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_hostname: api_hostname.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            transcription_model: String::from("whisper-1"),
            speech_model: String::from("tts-1"),
            speech_voice: String::from("nova"),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            transcription_model: config.transcription_model.clone(),
            speech_model: config.speech_model.clone(),
            speech_voice: config.speech_voice.clone(),
            ..Self::new(
                &config.openai_api_hostname,
                &config.openai_api_key,
                &config.openai_model,
            )
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_hostname, path)
    }

    pub(crate) fn post(&self, path: &str, timeout: Duration) -> reqwest::RequestBuilder {
        self.http
            .post(self.url(path))
            .bearer_auth(&self.api_key)
            .timeout(timeout)
    }

    /// Raw HTTP client, for fetching resources that aren't part of
    /// the model API.
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

/// Request a chat completion and return the raw JSON response.
pub async fn completion(client: &OpenAiClient, messages: &[Message]) -> Result<Value, Error> {
    let payload = json!({
        "model": client.model,
        "messages": messages,
    });
    let response = client
        .post("/v1/chat/completions", Duration::from_secs(60 * 10))
        .header("Content-Type", "application/json")
        .json(&payload)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(response)
}
