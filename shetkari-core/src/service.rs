use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::advisor::{Advice, AdvisoryProvider};
use crate::error::ShetkariResult;
use crate::models::{ChatHistoryResponse, ChatMessage, ChatRequest, ChatResponse};
use crate::repo::MessageRepository;

/// Most messages a single history lookup will return.
pub const HISTORY_LIMIT: i64 = 1000;

/// Orchestrates one chat exchange: persist the farmer's message, ask the
/// advisory provider, persist the reply, return the reply envelope.
pub struct ChatService {
    repo: Arc<dyn MessageRepository>,
    advisor: Arc<dyn AdvisoryProvider>,
    context_turns: usize,
}

impl ChatService {
    pub fn new(
        repo: Arc<dyn MessageRepository>,
        advisor: Arc<dyn AdvisoryProvider>,
        context_turns: usize,
    ) -> Self {
        Self {
            repo,
            advisor,
            context_turns,
        }
    }

    /// Handle one send. Provider failures never surface here: the reply
    /// degrades to the canned fallback and the exchange is still stored.
    /// Persistence failures do surface.
    pub async fn send_message(&self, request: ChatRequest) -> ShetkariResult<ChatResponse> {
        // Context is read before the new message lands, so it holds prior
        // turns only.
        let context = self
            .repo
            .recent_for_session(&request.session_id, self.context_turns as i64)
            .await?;

        let user_message = ChatMessage::user(request.session_id.clone(), request.message.clone());
        self.repo.insert(&user_message).await?;
        debug!(session_id = %request.session_id, "Stored user message");

        let advice = match self.advisor.generate(&request.message, &context).await {
            Ok(advice) => advice,
            Err(err) => {
                warn!(
                    provider = self.advisor.provider_name(),
                    error_code = err.error_code(),
                    error = %err,
                    "Advisory provider failed, using fallback reply"
                );
                Advice::fallback()
            }
        };

        let bot_message =
            ChatMessage::bot(request.session_id.clone(), advice.text, advice.sources);
        let stored = self.repo.insert(&bot_message).await?;
        info!(
            session_id = %request.session_id,
            message_id = %stored.id,
            sources = stored.sources.len(),
            "Stored bot reply"
        );

        Ok(ChatResponse::from(stored))
    }

    /// Full transcript for a session, oldest first. Unknown sessions return
    /// an empty list.
    pub async fn session_history(&self, session_id: &str) -> ShetkariResult<ChatHistoryResponse> {
        let messages = self.repo.list_for_session(session_id, HISTORY_LIMIT).await?;

        Ok(ChatHistoryResponse {
            session_id: session_id.to_string(),
            messages,
        })
    }
}
