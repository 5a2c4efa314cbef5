//! HTTP client for the chat API used by the terminal chat
use anyhow::{Context, Error, Result, anyhow};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::api::public::{chat::ChatResponse, sessions::ChatMessage, sessions::ChatSession};

pub struct ApiClient {
    http: reqwest::Client,
    api_base_url: String,
    uid: String,
}

impl ApiClient {
    pub fn new(api_base_url: &str, uid: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base_url: format!("{}/api", api_base_url.trim_end_matches('/')),
            uid: uid.to_string(),
        }
    }

    async fn parse<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if !status.is_success() {
            let body: Value = resp.json().await.unwrap_or(Value::Null);
            let msg = body["error"].as_str().unwrap_or("no details").to_string();
            return Err(anyhow!("Request failed with {}: {}", status, msg));
        }
        resp.json::<T>()
            .await
            .with_context(|| "Attempted to parse response from json")
    }

    pub async fn list_chats(&self) -> Result<Vec<ChatSession>, Error> {
        let url = format!("{}/list-chats/{}", self.api_base_url, self.uid);
        let resp = self.http.get(url).send().await?;
        Self::parse(resp).await
    }

    pub async fn new_chat(&self) -> Result<ChatSession, Error> {
        let url = format!("{}/new-chat", self.api_base_url);
        let resp = self
            .http
            .post(url)
            .json(&json!({ "uid": self.uid }))
            .send()
            .await?;
        Self::parse(resp).await
    }

    pub async fn chat_messages(&self, chat_id: &str) -> Result<Vec<ChatMessage>, Error> {
        let url = format!("{}/chat-messages/{}/{}", self.api_base_url, self.uid, chat_id);
        let resp = self.http.get(url).send().await?;
        Self::parse(resp).await
    }

    pub async fn send(&self, chat_id: Option<&str>, text: &str) -> Result<ChatResponse, Error> {
        let url = format!("{}/chat", self.api_base_url);
        let resp = self
            .http
            .post(url)
            .json(&json!({ "uid": self.uid, "did": chat_id, "text": text }))
            .send()
            .await?;
        Self::parse(resp).await
    }
}
