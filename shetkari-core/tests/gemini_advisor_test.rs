use std::time::Duration;

use shetkari_core::advisor::{AdvisoryProvider, GeminiAdvisor};
use shetkari_core::config::AdvisorConfig;
use shetkari_core::error::ShetkariError;
use shetkari_core::models::ChatMessage;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config() -> AdvisorConfig {
    AdvisorConfig {
        api_key: "test-key".to_string(),
        ..AdvisorConfig::default()
    }
}

/// Mounts a catch-all `generateContent` mock and returns an advisor pointed
/// at the mock server.
async fn mounted_advisor(server: &MockServer, template: ResponseTemplate) -> GeminiAdvisor {
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(query_param("key", "test-key"))
        .respond_with(template)
        .mount(server)
        .await;

    GeminiAdvisor::with_base_url(&config(), server.uri())
}

fn grounded_response() -> String {
    r#"{
        "candidates": [{
            "content": {
                "parts": [{"text": "Sow gram after the first winter rain."}],
                "role": "model"
            },
            "finishReason": "STOP",
            "groundingMetadata": {
                "groundingChunks": [
                    {"web": {"uri": "https://example.org/gram", "title": "Gram sowing window"}},
                    {"web": {"uri": "https://example.org/rabi", "title": "Rabi crop calendar"}}
                ],
                "webSearchQueries": ["gram sowing time"]
            }
        }],
        "modelVersion": "gemini-2.5-flash"
    }"#
    .to_string()
}

fn ungrounded_response() -> String {
    r#"{
        "candidates": [{
            "content": {"parts": [{"text": "Namaskar! How can I help your farm today?"}]}
        }]
    }"#
    .to_string()
}

mod response_parsing {
    use super::*;

    #[tokio::test]
    async fn test_grounded_reply_with_sources() {
        let server = MockServer::start().await;
        let advisor = mounted_advisor(
            &server,
            ResponseTemplate::new(200).set_body_string(grounded_response()),
        )
        .await;

        let advice = advisor.generate("When should I sow gram?", &[]).await.unwrap();

        assert_eq!(advice.text, "Sow gram after the first winter rain.");
        assert_eq!(advice.sources.len(), 2);
        assert_eq!(advice.sources[0].title, "Gram sowing window");
        assert_eq!(advice.sources[0].url, "https://example.org/gram");
        assert_eq!(advice.sources[1].url, "https://example.org/rabi");
    }

    #[tokio::test]
    async fn test_reply_without_grounding_has_no_sources() {
        let server = MockServer::start().await;
        let advisor = mounted_advisor(
            &server,
            ResponseTemplate::new(200).set_body_string(ungrounded_response()),
        )
        .await;

        let advice = advisor.generate("namaskar", &[]).await.unwrap();

        assert_eq!(advice.text, "Namaskar! How can I help your farm today?");
        assert!(advice.sources.is_empty());
    }

    #[tokio::test]
    async fn test_empty_candidates_is_an_error() {
        let server = MockServer::start().await;
        let advisor = mounted_advisor(
            &server,
            ResponseTemplate::new(200).set_body_string(r#"{"candidates": []}"#),
        )
        .await;

        let err = advisor.generate("question", &[]).await.unwrap_err();

        assert!(matches!(err, ShetkariError::EmptyAdvisoryReply));
    }

    #[tokio::test]
    async fn test_blank_reply_text_is_an_error() {
        let server = MockServer::start().await;
        let advisor = mounted_advisor(
            &server,
            ResponseTemplate::new(200)
                .set_body_string(r#"{"candidates": [{"content": {"parts": [{"text": "  "}]}}]}"#),
        )
        .await;

        let err = advisor.generate("question", &[]).await.unwrap_err();

        assert!(matches!(err, ShetkariError::EmptyAdvisoryReply));
    }
}

mod provider_errors {
    use super::*;

    #[tokio::test]
    async fn test_server_error_maps_to_unavailable() {
        let server = MockServer::start().await;
        let advisor = mounted_advisor(&server, ResponseTemplate::new(500)).await;

        let err = advisor.generate("question", &[]).await.unwrap_err();

        assert!(matches!(err, ShetkariError::AdvisoryUnavailable(_)));
        assert!(err.is_advisory_error());
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_auth_rejection_maps_to_auth_failed() {
        let server = MockServer::start().await;
        let advisor = mounted_advisor(&server, ResponseTemplate::new(403)).await;

        let err = advisor.generate("question", &[]).await.unwrap_err();

        match err {
            ShetkariError::AdvisoryAuthFailed { service, message } => {
                assert_eq!(service, "127.0.0.1");
                assert!(message.contains("403"));
            }
            other => panic!("expected AdvisoryAuthFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_rate_limited() {
        let server = MockServer::start().await;
        let advisor = mounted_advisor(&server, ResponseTemplate::new(429)).await;

        let err = advisor.generate("question", &[]).await.unwrap_err();

        match err {
            ShetkariError::AdvisoryRateLimited {
                retry_after_secs, ..
            } => assert_eq!(retry_after_secs, 60),
            other => panic!("expected AdvisoryRateLimited, got {other:?}"),
        }
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_slow_provider_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(ungrounded_response())
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let advisor_config = AdvisorConfig {
            request_timeout_secs: 1,
            ..config()
        };
        let advisor = GeminiAdvisor::with_base_url(&advisor_config, server.uri());

        let err = advisor.generate("question", &[]).await.unwrap_err();

        assert!(matches!(err, ShetkariError::AdvisoryTimeout(_)));
    }
}

mod request_shape {
    use super::*;

    #[tokio::test]
    async fn test_request_carries_history_and_grounding_tool() {
        let server = MockServer::start().await;
        let advisor = mounted_advisor(
            &server,
            ResponseTemplate::new(200).set_body_string(ungrounded_response()),
        )
        .await;

        let history = vec![
            ChatMessage::user("s1".to_string(), "Leaves are yellowing.".to_string()),
            ChatMessage::bot(
                "s1".to_string(),
                "That points to nitrogen deficiency.".to_string(),
                Vec::new(),
            ),
        ];

        advisor
            .generate("How much urea should I apply?", &history)
            .await
            .unwrap();

        let requests = server.received_requests().await.expect("requests recorded");
        assert_eq!(requests.len(), 1);

        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(
            contents[2]["parts"][0]["text"],
            "How much urea should I apply?"
        );

        assert_eq!(body["tools"][0]["google_search"], serde_json::json!({}));
        assert!(body["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Shetkari Mitra"));
        assert_eq!(body["generationConfig"]["temperature"], 0.4);
    }
}
