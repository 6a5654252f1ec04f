// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end integration tests for the complete Parley pipeline.
//!
//! Each test wires the real storage, engine, and gateway router against
//! mock provider/embedder adapters. Tests are independent and
//! order-insensitive.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use parley_agent::AskEngine;
use parley_config::ParleyConfig;
use parley_gateway::auth::AuthConfig;
use parley_gateway::{GatewayState, build_router};
use parley_storage::{Database, queries};
use parley_test_utils::{MockEmbedder, MockProvider};
use tower::ServiceExt;

struct Harness {
    state: GatewayState,
    provider: Arc<MockProvider>,
}

impl Harness {
    async fn new(responses: Vec<&str>) -> Self {
        Self::with_db(Database::open_in_memory().await.unwrap(), responses).await
    }

    async fn with_db(db: Database, responses: Vec<&str>) -> Self {
        let provider = Arc::new(MockProvider::with_responses(
            responses.into_iter().map(String::from).collect(),
        ));
        let embedder = Arc::new(MockEmbedder::new(3));
        let config = ParleyConfig::default();
        let engine = Arc::new(AskEngine::new(db, provider.clone(), embedder, &config));

        Self {
            state: GatewayState {
                engine,
                auth: AuthConfig { bearer_token: None },
                webhook: None,
                start_time: std::time::Instant::now(),
            },
            provider,
        }
    }

    fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    async fn ask(&self, conversation_id: &str, question: &str) -> (StatusCode, serde_json::Value) {
        let response = self
            .router()
            .oneshot(
                Request::post("/ask")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "conversation_id": conversation_id,
                            "question": question,
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}

#[tokio::test]
async fn ask_returns_mock_answer_and_persists_turns() {
    let harness = Harness::new(vec!["Hello from Parley!"]).await;

    let (status, body) = harness.ask("c-e2e", "Hi there, what are you").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "Hello from Parley!");

    let messages = queries::messages::list_messages(harness.state.engine.db(), "c-e2e", None)
        .await
        .unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "Hi there, what are you");
    assert_eq!(messages[1].content, "Hello from Parley!");
}

#[tokio::test]
async fn multi_turn_conversation_accumulates_history() {
    let harness = Harness::new(vec!["First response", "Second response"]).await;

    harness.ask("c-multi", "first substantial question here").await;
    harness.ask("c-multi", "second question").await;

    let messages = queries::messages::list_messages(harness.state.engine.db(), "c-multi", None)
        .await
        .unwrap();
    assert_eq!(messages.len(), 4);

    // The second provider call saw the first exchange in its prompt.
    let requests = harness.provider.requests().await;
    let second_prompt = &requests[1].messages;
    let contents: Vec<&str> = second_prompt.iter().map(|t| t.content.as_str()).collect();
    assert!(contents.contains(&"first substantial question here"));
    assert!(contents.contains(&"First response"));
}

#[tokio::test]
async fn memory_recall_crosses_conversations() {
    let harness = Harness::new(vec![
        "the eiffel tower is 330 meters tall today",
        "as I said, about 330 meters overall",
    ])
    .await;

    harness
        .ask("c-a", "how tall is the eiffel tower")
        .await;
    harness
        .ask("c-b", "remind me about the eiffel tower height")
        .await;

    // The second ask, in a different conversation, gets the remembered
    // Q&A injected as a system context turn.
    let requests = harness.provider.requests().await;
    let second_prompt = &requests[1].messages;
    let qa_turn = second_prompt
        .iter()
        .find(|t| t.role == "system" && t.content.contains("Q1:"));
    assert!(qa_turn.is_some(), "expected recalled Q&A context");
    assert!(qa_turn.unwrap().content.contains("how tall is the eiffel tower"));
}

#[tokio::test]
async fn conversation_survives_reopen_of_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("e2e.db");
    let path = db_path.to_str().unwrap();

    {
        let db = Database::open(path).await.unwrap();
        let harness = Harness::with_db(db, vec!["persisted answer text"]).await;
        harness.ask("c-persist", "will this survive a restart").await;
        harness.state.engine.db().close().await.unwrap();
    }

    let db = Database::open(path).await.unwrap();
    let messages = queries::messages::list_messages(&db, "c-persist", None)
        .await
        .unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].content, "persisted answer text");

    let conv = queries::conversations::get_conversation(&db, "c-persist")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(conv.title, "will this survive a restart");
}

#[tokio::test]
async fn provider_failure_surfaces_as_500_with_error_body() {
    let db = Database::open_in_memory().await.unwrap();
    let provider = Arc::new(MockProvider::failing());
    let embedder = Arc::new(MockEmbedder::new(3));
    let config = ParleyConfig::default();
    let engine = Arc::new(AskEngine::new(db, provider, embedder, &config));
    let state = GatewayState {
        engine,
        auth: AuthConfig { bearer_token: None },
        webhook: None,
        start_time: std::time::Instant::now(),
    };

    let response = build_router(state)
        .oneshot(
            Request::post("/ask")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"conversation_id": "c-err", "question": "does this fail cleanly"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].as_str().unwrap().contains("provider error"));
}

#[tokio::test]
async fn full_crud_lifecycle_over_http() {
    let harness = Harness::new(vec!["lifecycle answer, with plenty of words"]).await;
    let app = harness.router();

    // Start a new conversation via the API.
    let response = app
        .clone()
        .oneshot(Request::post("/conversations").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let created: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let id = created["conversation_id"].as_str().unwrap().to_string();

    // Ask into it.
    let (status, _) = harness.ask(&id, "a question for the lifecycle test").await;
    assert_eq!(status, StatusCode::OK);

    // It is listed with the promoted title.
    let response = app
        .clone()
        .oneshot(Request::get("/conversations").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let listed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(listed[0]["conversation_id"], id.as_str());
    assert_eq!(listed[0]["title"], "a question for the lifecycle test");

    // Delete removes it and its messages.
    let response = app
        .clone()
        .oneshot(
            Request::delete(format!("/conversations/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let messages = queries::messages::list_messages(harness.state.engine.db(), &id, None)
        .await
        .unwrap();
    assert!(messages.is_empty());
}
