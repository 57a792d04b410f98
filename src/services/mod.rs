pub mod openai;

pub use openai::{AiClient, AiError, ChatMessage};
