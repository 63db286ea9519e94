//! In-process tests for the HTTP server mode: session lifecycle, the chat
//! round trip, and the error statuses for transitions the router does not
//! have.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use hearth_chat::conversation::Turn;
use hearth_chat::personas::PersonaRegistry;
use hearth_chat::provider::CompletionProvider;
use hearth_chat::server::{AppState, create_router};

struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String>>>,
}

impl ScriptedProvider {
    fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
        }
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn complete(&self, _system_prompt: &str, _turns: &[Turn]) -> Result<String> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("script exhausted")))
    }
}

fn test_router(replies: Vec<Result<String>>) -> Router {
    let state = AppState::new(
        Arc::new(PersonaRegistry::builtin()),
        Arc::new(ScriptedProvider::new(replies)),
        PathBuf::from("assets-that-do-not-exist"),
    );
    create_router(state)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read_json(response).await
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    read_json(response).await
}

async fn post_empty(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    read_json(response).await
}

async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
        json!({ "raw": String::from_utf8_lossy(&bytes).to_string() })
    });
    (status, value)
}

async fn create_session(app: &Router) -> String {
    let (status, body) = post_empty(app, "/api/sessions").await;
    assert_eq!(status, StatusCode::OK);
    body["session_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn status_reports_personas_and_sessions() {
    let app = test_router(vec![]);

    let (status, body) = get_json(&app, "/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["personas"], 4);
    assert_eq!(body["sessions"], 0);
}

#[tokio::test]
async fn personas_are_listed_in_registry_order() {
    let app = test_router(vec![]);

    let (status, body) = get_json(&app, "/api/personas").await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["medical", "recipe", "academic", "lesson"]);

    // no assets dir in tests, so every card degrades to no image
    for persona in body.as_array().unwrap() {
        assert_eq!(persona["has_image"], false);
        assert!(persona["theme"]["button"].as_str().unwrap().starts_with('#'));
    }
}

#[tokio::test]
async fn missing_image_is_a_plain_404() {
    let app = test_router(vec![]);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/personas/medical/image")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/personas/astrology/image")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_lifecycle_home_chat_home() {
    let app = test_router(vec![Ok("Hello there!".into())]);
    let sid = create_session(&app).await;

    // starts at home
    let (status, body) = get_json(&app, &format!("/api/sessions/{sid}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["view"], "home");

    // select: greeting present while the conversation is empty
    let (status, body) = post_json(
        &app,
        &format!("/api/sessions/{sid}/select"),
        json!({ "persona_id": "medical" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["greeting"].as_str().unwrap().contains("Dr. Leo"));
    assert_eq!(body["turns"].as_array().unwrap().len(), 0);

    // chat: both phases come back
    let (status, body) = post_json(
        &app,
        &format!("/api/sessions/{sid}/chat"),
        json!({ "message": "My kid has a cough" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "user");
    assert_eq!(body["user"]["content"], "My kid has a cough");
    assert_eq!(body["assistant"]["role"], "assistant");
    assert_eq!(body["assistant"]["content"], "Hello there!");

    // messages reflect the stored conversation
    let (status, body) = get_json(&app, &format!("/api/sessions/{sid}/messages")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    // back to home
    let (status, _) = post_empty(&app, &format!("/api/sessions/{sid}/back")).await;
    assert_eq!(status, StatusCode::OK);

    // re-select: conversation kept, greeting gone
    let (status, body) = post_json(
        &app,
        &format!("/api/sessions/{sid}/select"),
        json!({ "persona_id": "medical" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["greeting"].is_null());
    assert_eq!(body["turns"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn transitions_the_router_does_not_have_are_conflicts() {
    let app = test_router(vec![]);
    let sid = create_session(&app).await;

    // chat and messages need an active persona
    let (status, _) = post_json(
        &app,
        &format!("/api/sessions/{sid}/chat"),
        json!({ "message": "hi" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = get_json(&app, &format!("/api/sessions/{sid}/messages")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // back only exists from chat
    let (status, _) = post_empty(&app, &format!("/api/sessions/{sid}/back")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // select only exists from home
    let (status, _) = post_json(
        &app,
        &format!("/api/sessions/{sid}/select"),
        json!({ "persona_id": "medical" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post_json(
        &app,
        &format!("/api/sessions/{sid}/select"),
        json!({ "persona_id": "recipe" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let app = test_router(vec![]);

    let (status, _) = get_json(&app, "/api/sessions/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let sid = create_session(&app).await;
    let (status, body) = post_json(
        &app,
        &format!("/api/sessions/{sid}/select"),
        json!({ "persona_id": "astrology" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["raw"].as_str().unwrap().contains("astrology"));
}

#[tokio::test]
async fn empty_message_is_rejected_before_any_state_change() {
    let app = test_router(vec![]);
    let sid = create_session(&app).await;
    post_json(
        &app,
        &format!("/api/sessions/{sid}/select"),
        json!({ "persona_id": "medical" }),
    )
    .await;

    let (status, _) = post_json(
        &app,
        &format!("/api/sessions/{sid}/chat"),
        json!({ "message": "   " }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = get_json(&app, &format!("/api/sessions/{sid}/messages")).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn gateway_failure_still_returns_a_conversation_turn() {
    let app = test_router(vec![Err(anyhow!("upstream timed out"))]);
    let sid = create_session(&app).await;
    post_json(
        &app,
        &format!("/api/sessions/{sid}/select"),
        json!({ "persona_id": "lesson" }),
    )
    .await;

    let (status, body) = post_json(
        &app,
        &format!("/api/sessions/{sid}/chat"),
        json!({ "message": "hello" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["assistant"]["role"], "assistant");
    assert!(
        body["assistant"]["content"]
            .as_str()
            .unwrap()
            .contains("upstream timed out")
    );

    // the failed turn is part of the history and chatting continues
    let (_, messages) = get_json(&app, &format!("/api/sessions/{sid}/messages")).await;
    assert_eq!(messages.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn sessions_are_isolated_from_each_other() {
    let app = test_router(vec![Ok("for session one".into())]);
    let sid1 = create_session(&app).await;
    let sid2 = create_session(&app).await;

    post_json(
        &app,
        &format!("/api/sessions/{sid1}/select"),
        json!({ "persona_id": "medical" }),
    )
    .await;
    post_json(
        &app,
        &format!("/api/sessions/{sid1}/chat"),
        json!({ "message": "only in session one" }),
    )
    .await;

    // session two is untouched: still at home, no conversations
    let (_, body) = get_json(&app, &format!("/api/sessions/{sid2}")).await;
    assert_eq!(body["view"], "home");
    assert_eq!(body["turn_counts"].as_object().unwrap().len(), 0);
}
