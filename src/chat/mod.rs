mod core;
pub mod db;
mod error;
pub mod history;
pub mod models;

pub use self::core::Chat;
pub use error::ChatError;
pub use history::{CLIENT_CONTEXT_LIMIT, DEFAULT_HISTORY_LIMIT, History, assemble_transcript};
pub use models::{ChatMessage, ChatSession, Sender, Turn};
