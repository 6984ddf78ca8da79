pub mod gemini;

pub use gemini::GeminiAdvisor;

use async_trait::async_trait;

use crate::error::ShetkariResult;
use crate::models::{ChatMessage, ChatSource};

/// System prompt sent with every provider call. Fixed at build time; there is
/// no per-request prompt customization.
pub const SYSTEM_INSTRUCTION: &str = r#"You are 'Shetkari Mitra' (Farmer's Friend), an expert, helpful, and highly practical agricultural advisor.

CRITICAL RULES:
1. LANGUAGE MATCHING: You MUST detect the language of the farmer's input and reply ENTIRELY in that SAME language. If they write in Marathi, respond in Marathi. If Hindi, respond in Hindi. If English, respond in English. Support ALL languages including regional Indian languages.

2. EXPERTISE SCOPE: Provide advice ONLY on:
   - Crop management and cultivation techniques
   - Soil health, fertility, and conservation
   - Fertilizer application, nutrients, and organic farming
   - Pest and disease identification and integrated pest management
   - Irrigation techniques and water management
   - Local farming best practices and seasonal advice
   - Agricultural machinery and tools
   - Post-harvest management and storage

3. RESPONSE STYLE: Keep answers:
   - Concise, practical, and farmer-friendly
   - Easy to understand for farmers with varying education levels
   - Action-oriented with clear, numbered steps when appropriate
   - Include specific recommendations with quantities, timings, and measurements
   - Use local terminology and units familiar to Indian farmers

4. GROUNDING: Use your knowledge to give accurate, up-to-date information. Always base your answers on verified agricultural knowledge.

5. SAFETY: If asked about non-agricultural topics, politely redirect the conversation to farming-related queries.
"#;

/// Marathi-then-English reply handed out whenever the provider fails.
pub const FALLBACK_REPLY: &str = "मला माफ करा, मला तुमच्या प्रश्नाचे उत्तर देण्यात अडचण येत आहे. कृपया पुन्हा प्रयत्न करा. | Sorry, I'm having trouble answering your question. Please try again.";

/// A generated reply plus the web citations that ground it.
#[derive(Debug, Clone, PartialEq)]
pub struct Advice {
    pub text: String,
    pub sources: Vec<ChatSource>,
}

impl Advice {
    /// The canned reply used when no real answer could be produced.
    pub fn fallback() -> Self {
        Self {
            text: FALLBACK_REPLY.to_string(),
            sources: Vec::new(),
        }
    }
}

#[async_trait]
pub trait AdvisoryProvider: Send + Sync {
    fn provider_name(&self) -> &str;

    /// Generate advice for `question`. `history` carries prior stored turns of
    /// the same session, oldest first, so the provider can follow the
    /// conversation.
    async fn generate(&self, question: &str, history: &[ChatMessage])
        -> ShetkariResult<Advice>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockAdvisor {
        name: String,
        reply: String,
    }

    impl MockAdvisor {
        fn new(name: &str, reply: &str) -> Self {
            Self {
                name: name.to_string(),
                reply: reply.to_string(),
            }
        }
    }

    #[async_trait]
    impl AdvisoryProvider for MockAdvisor {
        fn provider_name(&self) -> &str {
            &self.name
        }

        async fn generate(
            &self,
            _question: &str,
            history: &[ChatMessage],
        ) -> ShetkariResult<Advice> {
            assert!(history.is_empty());
            Ok(Advice {
                text: self.reply.clone(),
                sources: Vec::new(),
            })
        }
    }

    #[tokio::test]
    async fn test_mock_advisor() {
        let advisor = MockAdvisor::new("mock", "Sow after the first monsoon rain.");

        assert_eq!(advisor.provider_name(), "mock");

        let advice = advisor.generate("When do I sow?", &[]).await.unwrap();
        assert_eq!(advice.text, "Sow after the first monsoon rain.");
        assert!(advice.sources.is_empty());
    }

    #[test]
    fn test_fallback_is_bilingual() {
        let advice = Advice::fallback();

        assert!(advice.text.contains("मला माफ करा"));
        assert!(advice.text.contains("Sorry, I'm having trouble"));
        assert!(advice.text.contains(" | "));
        assert!(advice.sources.is_empty());
    }

    #[test]
    fn test_system_instruction_pins_scope() {
        assert!(SYSTEM_INSTRUCTION.starts_with("You are 'Shetkari Mitra'"));
        assert!(SYSTEM_INSTRUCTION.contains("LANGUAGE MATCHING"));
        assert!(SYSTEM_INSTRUCTION.contains("EXPERTISE SCOPE"));
    }
}
