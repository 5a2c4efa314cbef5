use anyhow::{Error, Result, anyhow};

use crate::openai::{Message, OpenAiClient, Role, completion};

/// Runs the next turn in chat by passing the system message and a
/// transcript to the LLM. Returns the text of the first choice.
pub async fn chat(
    client: &OpenAiClient,
    system_message: &str,
    transcript: &[Message],
) -> Result<String, Error> {
    let mut messages = Vec::with_capacity(transcript.len() + 1);
    messages.push(Message::new(Role::System, system_message));
    messages.extend_from_slice(transcript);

    let resp = completion(client, &messages).await?;

    resp["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("No message received. Resp:\n\n {}", resp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_chat_prepends_system_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_body(mockito::Matcher::PartialJson(json!({
                "messages": [
                    {"role": "system", "content": "Be kind."},
                    {"role": "user", "content": "hi"},
                    {"role": "assistant", "content": "hello"},
                    {"role": "user", "content": "how are you"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "id": "chatcmpl-123",
                    "object": "chat.completion",
                    "choices": [{
                        "index": 0,
                        "message": {"role": "assistant", "content": "I'm doing well."},
                        "finish_reason": "stop"
                    }]
                }"#,
            )
            .create_async()
            .await;

        let client = OpenAiClient::new(&server.url(), "test-key", "gpt-4o-mini");
        let transcript = vec![
            Message::new(Role::User, "hi"),
            Message::new(Role::Assistant, "hello"),
            Message::new(Role::User, "how are you"),
        ];
        let reply = chat(&client, "Be kind.", &transcript).await.unwrap();

        mock.assert_async().await;
        assert_eq!(reply, "I'm doing well.");
    }

    #[tokio::test]
    async fn test_chat_errors_without_content() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let client = OpenAiClient::new(&server.url(), "test-key", "gpt-4o-mini");
        let result = chat(&client, "Be kind.", &[Message::new(Role::User, "hi")]).await;

        assert!(result.is_err());
    }
}
