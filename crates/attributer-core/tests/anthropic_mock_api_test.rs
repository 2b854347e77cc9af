//! Responder against a mocked Anthropic Messages endpoint.
//!
//! Response bodies follow the Messages API shape: `content` is a list of typed blocks
//! and errors arrive as `{"type":"error","error":{...}}`.

use std::sync::Arc;
use std::time::Duration;

use attributer_core::{
    AnthropicMessages, ErrorKind, FormatError, Responder, ResponderError, StyleProfile,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn text_message(text: &str) -> serde_json::Value {
    json!({
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "model": "claude-sonnet-4-20250514",
        "content": [{ "type": "text", "text": text }],
        "stop_reason": "end_turn",
        "usage": { "input_tokens": 900, "output_tokens": 400 }
    })
}

fn responder_for(server: &MockServer, timeout: Duration) -> Responder {
    let client = AnthropicMessages::new("sk-ant-test", timeout).with_base_url(&server.uri());
    Responder::new(Arc::new(client), StyleProfile::embedded())
}

#[tokio::test]
async fn roadmap_question_yields_full_response_set() {
    let server = MockServer::start().await;
    let model_text = "Here you go:\n{\"version1\":\"Short take.\",\"version2\":\"Two paragraphs.\",\"version3\":\"Long form.\",\"recommendation\":\"Version 2 is recommended for a conceptual question.\"}";

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-ant-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-sonnet-4-20250514",
            "max_tokens": 4096,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_message(model_text)))
        .expect(1)
        .mount(&server)
        .await;

    let set = responder_for(&server, Duration::from_secs(5))
        .respond("What's your roadmap for 2026?")
        .await
        .unwrap();

    assert_eq!(set.version1, "Short take.");
    assert_eq!(set.version2, "Two paragraphs.");
    assert_eq!(set.version3, "Long form.");
    assert!(set.recommendation.starts_with("Version 2 is recommended"));
    for field in [&set.version1, &set.version2, &set.version3, &set.recommendation] {
        assert!(!field.is_empty());
    }
}

#[tokio::test]
async fn request_body_carries_system_prompt_and_question() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_message(
            r#"{"version1":"a","version2":"b","version3":"c","recommendation":"r"}"#,
        )))
        .mount(&server)
        .await;

    responder_for(&server, Duration::from_secs(5))
        .respond("Is DeFi dead?")
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body["system"]
        .as_str()
        .unwrap()
        .starts_with("You are Alex Svanevik"));
    assert_eq!(body["messages"][0]["role"], "user");
    assert!(body["messages"][0]["content"]
        .as_str()
        .unwrap()
        .contains("Journalist question: \"Is DeFi dead?\""));
}

#[tokio::test]
async fn missing_recommendation_is_format_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_message(
            r#"{"version1":"a","version2":"b","version3":"c"}"#,
        )))
        .mount(&server)
        .await;

    let err = responder_for(&server, Duration::from_secs(5))
        .respond("Q")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ResponderError::Format(FormatError::MissingKey("recommendation"))
    ));
    assert_eq!(err.public_message(), "Failed to parse AI response");
}

#[tokio::test]
async fn non_text_block_is_unexpected_format() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_02",
            "type": "message",
            "role": "assistant",
            "content": [{ "type": "tool_use", "id": "toolu_1", "name": "x", "input": {} }]
        })))
        .mount(&server)
        .await;

    let err = responder_for(&server, Duration::from_secs(5))
        .respond("Q")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert_eq!(err.public_message(), "Unexpected response format");
}

#[tokio::test]
async fn empty_content_is_unexpected_format() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_03",
            "type": "message",
            "role": "assistant",
            "content": [],
            "stop_reason": "end_turn"
        })))
        .mount(&server)
        .await;

    let err = responder_for(&server, Duration::from_secs(5))
        .respond("Q")
        .await
        .unwrap_err();
    assert!(matches!(err, ResponderError::Format(FormatError::NonText(_))));
    assert_eq!(err.kind(), ErrorKind::Format);
    assert_eq!(err.public_message(), "Unexpected response format");
}

#[tokio::test]
async fn provider_error_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(529).set_body_json(json!({
            "type": "error",
            "error": { "type": "overloaded_error", "message": "Overloaded" }
        })))
        .mount(&server)
        .await;

    let err = responder_for(&server, Duration::from_secs(5))
        .respond("Q")
        .await
        .unwrap_err();
    assert!(matches!(err, ResponderError::Upstream(ref m) if m == "Overloaded"));
}

#[tokio::test]
async fn provider_error_without_body_gets_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = responder_for(&server, Duration::from_secs(5))
        .respond("Q")
        .await
        .unwrap_err();
    assert!(matches!(err, ResponderError::Upstream(ref m) if m.contains("HTTP 502")));
}

#[tokio::test]
async fn slow_provider_times_out_as_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(text_message("{}"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = responder_for(&server, Duration::from_millis(200))
        .respond("Q")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Upstream);
}
