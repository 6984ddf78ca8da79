pub mod advisor;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repo;
pub mod service;

pub use advisor::{Advice, AdvisoryProvider, FALLBACK_REPLY, GeminiAdvisor, SYSTEM_INSTRUCTION};
pub use config::{
    AdvisorConfig, ConfigLoadError, DatabaseConfig, LoggingConfig, ServerConfig, ShetkariConfig,
};
pub use db::{Database, DatabaseError};
pub use error::{ShetkariError, ShetkariResult};
pub use models::{
    ChatHistoryResponse, ChatMessage, ChatRequest, ChatResponse, ChatSource, MessageRole,
};
pub use repo::{MessageRepository, PgMessageRepository};
pub use service::{ChatService, HISTORY_LIMIT};
