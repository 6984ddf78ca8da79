use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::AdvisorConfig;
use crate::error::{ShetkariError, ShetkariResult};
use crate::models::{ChatMessage, ChatSource, MessageRole};

use super::{Advice, AdvisoryProvider, SYSTEM_INSTRUCTION};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
const GEMINI_API_VERSION: &str = "v1beta";

/// Direct `generateContent` client with Google Search grounding enabled, so
/// replies carry web citations alongside the text.
pub struct GeminiAdvisor {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f64,
    top_p: f64,
    top_k: u32,
    max_output_tokens: u32,
    request_timeout: Duration,
}

impl GeminiAdvisor {
    pub fn new(config: &AdvisorConfig) -> Self {
        Self::with_base_url(config, GEMINI_API_BASE.to_string())
    }

    /// Point the advisor at a different endpoint. Tests use this to talk to a
    /// local mock server.
    pub fn with_base_url(config: &AdvisorConfig, base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            max_output_tokens: config.max_output_tokens,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    fn build_request(&self, question: &str, history: &[ChatMessage]) -> GenerateContentRequest {
        let mut contents = Vec::with_capacity(history.len() + 1);

        for message in history {
            let role = match message.role {
                MessageRole::User => "user",
                MessageRole::Bot => "model",
            };
            contents.push(Content {
                role: Some(role.to_string()),
                parts: vec![Part {
                    text: message.text.clone(),
                }],
            });
        }

        contents.push(Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: question.to_string(),
            }],
        });

        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: SYSTEM_INSTRUCTION.to_string(),
                }],
            },
            contents,
            tools: vec![Tool {
                google_search: GoogleSearch {},
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                top_p: self.top_p,
                top_k: self.top_k,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }
}

#[async_trait]
impl AdvisoryProvider for GeminiAdvisor {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    async fn generate(
        &self,
        question: &str,
        history: &[ChatMessage],
    ) -> ShetkariResult<Advice> {
        let url = format!(
            "{}/{}/models/{}:generateContent?key={}",
            self.base_url, GEMINI_API_VERSION, self.model, self.api_key
        );

        let request = self.build_request(question, history);

        let response = self
            .client
            .post(&url)
            .timeout(self.request_timeout)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body: GenerateContentResponse = response.json().await?;

        let candidate = body
            .candidates
            .into_iter()
            .next()
            .ok_or(ShetkariError::EmptyAdvisoryReply)?;

        debug!(finish_reason = ?candidate.finish_reason, "Gemini candidate received");

        let text: String = candidate
            .content
            .parts
            .iter()
            .map(|part| part.text.as_str())
            .collect();

        if text.trim().is_empty() {
            return Err(ShetkariError::EmptyAdvisoryReply);
        }

        let sources = extract_sources(candidate.grounding_metadata);

        Ok(Advice { text, sources })
    }
}

/// Flatten grounding metadata into citations. Chunks without a URI are
/// dropped; a missing title falls back to the URI so the link stays usable.
fn extract_sources(metadata: Option<GroundingMetadata>) -> Vec<ChatSource> {
    let metadata = match metadata {
        Some(m) => m,
        None => return Vec::new(),
    };

    metadata
        .grounding_chunks
        .into_iter()
        .filter_map(|chunk| chunk.web)
        .filter(|web| !web.uri.is_empty())
        .map(|web| {
            let title = if web.title.is_empty() {
                web.uri.clone()
            } else {
                web.title
            };
            ChatSource {
                title,
                url: web.uri,
            }
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    tools: Vec<Tool>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

// The REST field is snake_case even though the rest of the payload is
// camelCase, so no rename here.
#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    top_p: f64,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
    #[serde(default)]
    finish_reason: Option<String>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebSource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct WebSource {
    #[serde(default)]
    uri: String,
    #[serde(default)]
    title: String,
}
