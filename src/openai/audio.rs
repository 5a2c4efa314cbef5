use std::time::Duration;

use anyhow::{Context, Error, Result, anyhow};
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};

use crate::openai::OpenAiClient;

const AUDIO_TIMEOUT: Duration = Duration::from_secs(60 * 5);

/// Download the audio file at `audio_url`. Returns the bytes and a
/// file name to hand to the transcription API.
pub async fn fetch_audio(client: &OpenAiClient, audio_url: &str) -> Result<(Vec<u8>, String), Error> {
    let url = reqwest::Url::parse(audio_url)
        .with_context(|| format!("Invalid audio url: {}", audio_url))?;
    let file_name = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .unwrap_or("audio.wav")
        .to_string();

    let bytes = client
        .http()
        .get(url)
        .timeout(AUDIO_TIMEOUT)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    Ok((bytes.to_vec(), file_name))
}

/// Speech to text. Forwards the audio as-is, no format checks.
pub async fn transcription(
    client: &OpenAiClient,
    audio: Vec<u8>,
    file_name: &str,
) -> Result<String, Error> {
    let form = Form::new()
        .text("model", client.transcription_model.clone())
        .part("file", Part::bytes(audio).file_name(file_name.to_string()));

    let resp: Value = client
        .post("/v1/audio/transcriptions", AUDIO_TIMEOUT)
        .multipart(form)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    resp["text"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Transcription response missing text: {}", resp))
}

/// Text to speech. Returns the encoded audio (mp3).
pub async fn speech(client: &OpenAiClient, text: &str) -> Result<Vec<u8>, Error> {
    let payload = json!({
        "model": client.speech_model,
        "voice": client.speech_voice,
        "input": text,
    });

    let bytes = client
        .post("/v1/audio/speech", AUDIO_TIMEOUT)
        .header("Content-Type", "application/json")
        .json(&payload)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    Ok(bytes.to_vec())
}
