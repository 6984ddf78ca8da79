mod envelope;
mod message;

pub use envelope::{ChatHistoryResponse, ChatRequest, ChatResponse};
pub use message::{ChatMessage, ChatSource, MessageRole};
