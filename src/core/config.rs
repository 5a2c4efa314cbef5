use std::env;

use crate::chat::DEFAULT_HISTORY_LIMIT;

const DEFAULT_SYSTEM_MESSAGE: &str = "You are a kind, empathetic therapy assistant. Give the most human-like response. ONLY REPLY TO THERAPY RELATED QUESTIONS. If the user asks about non-therapy topics, politely say you can only help with therapy. Your name is Hestia.";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub db_path: String,
    pub media_path: String,
    pub openai_model: String,
    pub openai_api_hostname: String,
    pub openai_api_key: String,
    pub transcription_model: String,
    pub speech_model: String,
    pub speech_voice: String,
    pub system_message: String,
    // Number of stored turns read back when building a prompt
    pub history_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        let storage_path = env::var("HESTIA_STORAGE_PATH").unwrap_or("./".to_string());
        let db_path = format!("{}/hestia.db", storage_path.trim_end_matches('/'));
        let media_path = format!("{}/media", storage_path.trim_end_matches('/'));
        let openai_api_hostname = env::var("HESTIA_LLM_HOST")
            .unwrap_or_else(|_| "https://api.openai.com".to_string());
        let openai_api_key =
            env::var("OPENAI_API_KEY").unwrap_or_else(|_| "thiswontworkforopenai".to_string());
        let openai_model =
            env::var("HESTIA_LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let transcription_model = env::var("HESTIA_TRANSCRIPTION_MODEL")
            .unwrap_or_else(|_| "whisper-1".to_string());
        let speech_model =
            env::var("HESTIA_SPEECH_MODEL").unwrap_or_else(|_| "tts-1".to_string());
        let speech_voice = env::var("HESTIA_SPEECH_VOICE").unwrap_or_else(|_| "nova".to_string());
        let system_message = env::var("HESTIA_SYSTEM_MESSAGE")
            .unwrap_or_else(|_| DEFAULT_SYSTEM_MESSAGE.to_string());
        let history_limit = env::var("HESTIA_HISTORY_LIMIT")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_HISTORY_LIMIT);

        Self {
            storage_path,
            db_path,
            media_path,
            openai_api_hostname,
            openai_api_key,
            openai_model,
            transcription_model,
            speech_model,
            speech_voice,
            system_message,
            history_limit,
        }
    }
}
