mod audio;
mod chat;
mod core;

pub use audio::{fetch_audio, speech, transcription};
pub use chat::chat;
pub use self::core::{Message, OpenAiClient, Role, completion};
