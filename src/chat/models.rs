//! Records stored for each user's chat sessions.
use serde::{Deserialize, Serialize};

use crate::openai::{Message, Role};

/// A chat session owned by a single user.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub title: Option<String>,
    pub created_at: String,
}

/// One stored exchange. Either field may be missing when the turn was
/// written as a single message.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub id: i64,
    pub uid: String,
    pub session_id: String,
    pub user_input: Option<String>,
    pub reply: Option<String>,
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum Sender {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "ai")]
    Ai,
}

impl Sender {
    /// Anything other than "user" is treated as the assistant.
    pub fn parse(sender: &str) -> Self {
        if sender.trim().eq_ignore_ascii_case("user") {
            Sender::User
        } else {
            Sender::Ai
        }
    }
}

/// A single message as shown in a thread.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    pub created_at: String,
}

impl Turn {
    /// Role tagged messages for the model, user input first.
    pub fn transcript_messages(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(2);
        if let Some(input) = &self.user_input {
            messages.push(Message::new(Role::User, input));
        }
        if let Some(reply) = &self.reply {
            messages.push(Message::new(Role::Assistant, reply));
        }
        messages
    }

    /// Flatten into the thread view, user input first.
    pub fn chat_messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);
        if let Some(input) = &self.user_input {
            messages.push(ChatMessage {
                sender: Sender::User,
                text: input.clone(),
                created_at: self.created_at.clone(),
            });
        }
        if let Some(reply) = &self.reply {
            messages.push(ChatMessage {
                sender: Sender::Ai,
                text: reply.clone(),
                created_at: self.created_at.clone(),
            });
        }
        messages
    }
}
