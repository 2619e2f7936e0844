#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use httpmock::prelude::*;
use rust_decimal_macros::dec;
use serde_json::json;

use super::summary::{build_relay_prompt, system_prompt};
use super::*;
use crate::analytics::AnalyticsSnapshot;
use crate::config::Secret;
use crate::store::ExpenseStore;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_analytics() -> AnalyticsSnapshot {
    let mut store = ExpenseStore::new(dec!(2000));
    store.add_expense("500", "Food & Dining", "", day(2026, 10, 2)).unwrap();
    store.add_expense("300", "Transport", "", day(2026, 10, 5)).unwrap();
    store.add_expense("200", "Food & Dining", "", day(2026, 10, 9)).unwrap();
    AnalyticsSnapshot::compute(&store.snapshot(), day(2026, 10, 16))
}

fn direct_client(server: &MockServer, key: Option<&str>) -> AdvisoryClient {
    AdvisoryClient::direct_with_base_url(
        key.and_then(Secret::new),
        "test-model".to_string(),
        server.base_url(),
    )
    .unwrap()
}

// ── compose_summary ───────────────────────────────────────────

#[test]
fn test_summary_contains_every_figure() {
    let summary = summary_for(&sample_analytics());
    assert!(summary.contains("Budget: ₹2000."));
    assert!(summary.contains("Spent: ₹1000."));
    assert!(summary.contains("Remaining: ₹1000."));
    assert!(summary.contains("Food & Dining: ₹700"));
    assert!(summary.contains("Transport: ₹300"));
    assert!(summary.contains("Monthly trend: May: ₹0, Jun: ₹0, Jul: ₹0, Aug: ₹0, Sep: ₹0, Oct: ₹1000."));
    assert!(summary.contains("Total transactions: 3."));
}

#[test]
fn test_summary_is_deterministic() {
    let a = sample_analytics();
    assert_eq!(summary_for(&a), summary_for(&a));
}

#[test]
fn test_relay_prompt_embeds_summary_and_question() {
    let prompt = build_relay_prompt("Budget: ₹1.", "  Am I overspending?  ");
    assert!(prompt.starts_with("You are a friendly personal finance advisor."));
    assert!(prompt.contains("Data: Budget: ₹1."));
    assert!(prompt.ends_with("Question: Am I overspending?"));
}

// ── AdvisoryPipeline ──────────────────────────────────────────

#[test]
fn test_blank_question_is_noop() {
    let mut pipeline = AdvisoryPipeline::new();
    assert!(pipeline.begin("   ", &sample_analytics()).is_none());
    assert_eq!(*pipeline.state(), AdvisoryState::Idle);
}

#[test]
fn test_begin_then_complete() {
    let mut pipeline = AdvisoryPipeline::new();
    let req = pipeline.begin("Where can I cut costs?", &sample_analytics()).unwrap();
    assert_eq!(req.seq, 1);
    assert!(req.summary.contains("Total transactions: 3."));
    assert!(pipeline.is_waiting());

    assert!(pipeline.complete(req.seq, Ok(Answer("Cook at home.".into()))));
    assert_eq!(
        *pipeline.state(),
        AdvisoryState::Answered {
            question: "Where can I cut costs?".into(),
            answer: Answer("Cook at home.".into())
        }
    );
}

#[test]
fn test_stale_result_is_dropped() {
    let mut pipeline = AdvisoryPipeline::new();
    let analytics = sample_analytics();
    let first = pipeline.begin("first", &analytics).unwrap();
    let second = pipeline.begin("second", &analytics).unwrap();
    assert_eq!(second.seq, first.seq + 1);

    assert!(pipeline.complete(second.seq, Err(AdvisoryError::EmptyResponse)));
    assert!(!pipeline.complete(first.seq, Ok(Answer("late".into()))));
    assert!(matches!(
        pipeline.state(),
        AdvisoryState::Failed { question, error: AdvisoryError::EmptyResponse } if question == "second"
    ));
}

#[test]
fn test_reset_then_new_cycle() {
    let mut pipeline = AdvisoryPipeline::new();
    let analytics = sample_analytics();
    let req = pipeline.begin("q", &analytics).unwrap();
    pipeline.complete(req.seq, Ok(Answer("a".into())));
    pipeline.reset();
    assert_eq!(*pipeline.state(), AdvisoryState::Idle);

    let next = pipeline.begin("q2", &analytics).unwrap();
    assert_eq!(next.seq, 2);
}

#[test]
fn test_user_messages() {
    assert_eq!(
        AdvisoryError::Network("boom".into()).user_message(),
        "Network error. Please try again."
    );
    assert_eq!(AdvisoryError::Provider("quota".into()).user_message(), "quota");
    assert!(!AdvisoryError::EmptyResponse.user_message().is_empty());
}

// ── AdvisoryClient: direct ────────────────────────────────────

#[tokio::test]
async fn test_direct_success() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/messages")
                .header("x-api-key", "test-key")
                .header("anthropic-version", "2023-06-01")
                .json_body(json!({
                    "model": "test-model",
                    "max_tokens": 1000,
                    "temperature": 0.7,
                    "system": system_prompt("S"),
                    "messages": [{"role": "user", "content": "Am I overspending?"}]
                }));
            then.status(200).json_body(json!({
                "content": [{"type": "text", "text": "  You're fine.  "}]
            }));
        })
        .await;

    let answer = direct_client(&server, Some("test-key"))
        .ask("Am I overspending?", "S")
        .await
        .unwrap();
    mock.assert_async().await;
    assert_eq!(answer, Answer("You're fine.".into()));
}

#[tokio::test]
async fn test_direct_provider_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(401).json_body(json!({
                "type": "error",
                "error": {"type": "authentication_error", "message": "invalid x-api-key"}
            }));
        })
        .await;

    let err = direct_client(&server, Some("bad"))
        .ask("q", "S")
        .await
        .unwrap_err();
    assert_eq!(err, AdvisoryError::Provider("invalid x-api-key".into()));
}

#[tokio::test]
async fn test_direct_non_2xx_without_body_is_network() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(502).body("bad gateway");
        })
        .await;

    let err = direct_client(&server, Some("k")).ask("q", "S").await.unwrap_err();
    assert!(matches!(err, AdvisoryError::Network(_)));
}

#[tokio::test]
async fn test_direct_empty_content() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(200).json_body(json!({"content": []}));
        })
        .await;

    let err = direct_client(&server, Some("k")).ask("q", "S").await.unwrap_err();
    assert_eq!(err, AdvisoryError::EmptyResponse);
}

#[tokio::test]
async fn test_direct_reads_untyped_text_block() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(200).json_body(json!({
                "content": [
                    {"text": "Cut dining out."},
                    {"type": "tool_use", "text": "ignored"}
                ]
            }));
        })
        .await;

    let answer = direct_client(&server, Some("k")).ask("q", "S").await.unwrap();
    assert_eq!(answer, Answer("Cut dining out.".into()));
}

#[tokio::test]
async fn test_direct_without_key_makes_no_call() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200);
        })
        .await;

    let err = direct_client(&server, None).ask("q", "S").await.unwrap_err();
    assert!(matches!(err, AdvisoryError::Provider(_)));
    mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network() {
    let client = AdvisoryClient::relay("http://127.0.0.1:1/api/gemini".to_string()).unwrap();
    let err = client.ask("q", "S").await.unwrap_err();
    assert!(matches!(err, AdvisoryError::Network(_)));
}

// ── AdvisoryClient: relay ─────────────────────────────────────

#[tokio::test]
async fn test_relay_success() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/gemini")
                .json_body(json!({"prompt": build_relay_prompt("S", "q")}));
            then.status(200).json_body(json!({"answer": "Save more."}));
        })
        .await;

    let client = AdvisoryClient::relay(server.url("/api/gemini")).unwrap();
    let answer = client.ask("q", "S").await.unwrap();
    mock.assert_async().await;
    assert_eq!(answer.to_string(), "Save more.");
}

#[tokio::test]
async fn test_relay_error_passes_message_through() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/gemini");
            then.status(500).json_body(json!({"error": "Gemini API failed"}));
        })
        .await;

    let client = AdvisoryClient::relay(server.url("/api/gemini")).unwrap();
    let err = client.ask("q", "S").await.unwrap_err();
    assert_eq!(err.user_message(), "Gemini API failed");
}

#[tokio::test]
async fn test_relay_blank_answer_is_empty_response() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/gemini");
            then.status(200).json_body(json!({"answer": "   "}));
        })
        .await;

    let client = AdvisoryClient::relay(server.url("/api/gemini")).unwrap();
    assert_eq!(
        client.ask("q", "S").await.unwrap_err(),
        AdvisoryError::EmptyResponse
    );
}
