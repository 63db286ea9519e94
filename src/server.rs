//! HTTP server mode
//!
//! Exposes the persona chat over REST for frontend integration:
//! - GET  /api/status                     - Health check
//! - GET  /api/personas                   - Advisor list
//! - GET  /api/personas/{id}/image        - Advisor image (404 when absent)
//! - POST /api/sessions                   - Create a session
//! - GET  /api/sessions/{sid}             - Session view + turn counts
//! - POST /api/sessions/{sid}/select      - Home -> Chat
//! - POST /api/sessions/{sid}/back        - Chat -> Home
//! - GET  /api/sessions/{sid}/messages    - Active conversation
//! - POST /api/sessions/{sid}/chat        - Submit a message (both phases)
//!
//! Every session gets its own router state and conversation store; nothing is
//! shared across sessions and nothing survives a restart.

use anyhow::Result;
use axum::{
    Router,
    extract::{Path, State},
    http::{Method, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::{collections::HashMap, path::PathBuf, sync::Arc};
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::{
    chat,
    conversation::Turn,
    error::ChatError,
    personas::{Persona, PersonaRegistry, Theme},
    provider::CompletionProvider,
    session::{Session, View},
};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Advisor card data for frontend rendering
#[derive(Debug, Serialize)]
pub struct PersonaSummary {
    pub id: String,
    pub name: String,
    pub role: String,
    pub title: String,
    pub tagline: String,
    pub greeting: String,
    pub theme: Theme,
    pub has_image: bool,
}

impl PersonaSummary {
    fn from_persona(persona: &Persona, assets_dir: &std::path::Path) -> Self {
        let has_image = persona
            .image
            .as_ref()
            .map(|name| assets_dir.join(name).is_file())
            .unwrap_or(false);
        Self {
            id: persona.id.clone(),
            name: persona.name.clone(),
            role: persona.role.clone(),
            title: persona.title.clone(),
            tagline: persona.tagline.clone(),
            greeting: persona.greeting.clone(),
            theme: persona.theme.clone(),
            has_image,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub persona_id: String,
}

#[derive(Debug, Serialize)]
pub struct SelectResponse {
    pub persona_id: String,
    /// Present only while the conversation is empty; clients render it as a
    /// one-time welcome bubble, it is never part of the history
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
    pub turns: Vec<Turn>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Both phases of one submission: the echoed user turn and the assistant
/// reply (which carries the error text when the gateway fails)
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub user: Turn,
    pub assistant: Turn,
}

#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    #[serde(flatten)]
    pub view: View,
    pub turn_counts: HashMap<String, usize>,
}

// ============================================================================
// Server State
// ============================================================================

type Sessions = Arc<RwLock<HashMap<String, Arc<Mutex<Session>>>>>;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<PersonaRegistry>,
    pub provider: Arc<dyn CompletionProvider>,
    pub assets_dir: PathBuf,
    sessions: Sessions,
}

impl AppState {
    pub fn new(
        registry: Arc<PersonaRegistry>,
        provider: Arc<dyn CompletionProvider>,
        assets_dir: PathBuf,
    ) -> Self {
        Self {
            registry,
            provider,
            assets_dir,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn session(&self, sid: &str) -> Option<Arc<Mutex<Session>>> {
        self.sessions.read().await.get(sid).cloned()
    }
}

// ============================================================================
// Routes
// ============================================================================

/// Create the router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/personas", get(personas_handler))
        .route("/api/personas/{id}/image", get(persona_image_handler))
        .route("/api/sessions", post(create_session_handler))
        .route("/api/sessions/{sid}", get(get_session_handler))
        .route("/api/sessions/{sid}/select", post(select_handler))
        .route("/api/sessions/{sid}/back", post(back_handler))
        .route("/api/sessions/{sid}/messages", get(messages_handler))
        .route("/api/sessions/{sid}/chat", post(chat_handler))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(
    port: u16,
    registry: Arc<PersonaRegistry>,
    provider: Arc<dyn CompletionProvider>,
    assets_dir: PathBuf,
) -> Result<()> {
    let state = AppState::new(registry, provider, assets_dir);
    let app = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    println!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

async fn status_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "provider": state.provider.name(),
        "personas": state.registry.len(),
        "sessions": state.sessions.read().await.len(),
    }))
}

async fn personas_handler(State(state): State<AppState>) -> Json<Vec<PersonaSummary>> {
    let summaries = state
        .registry
        .iter()
        .map(|p| PersonaSummary::from_persona(p, &state.assets_dir))
        .collect();
    Json(summaries)
}

/// Serve a persona's image; a missing file is a plain 404, clients degrade to
/// rendering no image.
async fn persona_image_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let persona = match state.registry.get(&id) {
        Ok(p) => p,
        Err(e) => return (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    };

    let Some(name) = &persona.image else {
        return (StatusCode::NOT_FOUND, "no image configured").into_response();
    };

    let path = state.assets_dir.join(name);
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.essence_str().to_string())], bytes).into_response()
        }
        Err(_) => (StatusCode::NOT_FOUND, "image not found").into_response(),
    }
}

async fn create_session_handler(State(state): State<AppState>) -> Json<Value> {
    let sid = Uuid::new_v4().to_string();
    state
        .sessions
        .write()
        .await
        .insert(sid.clone(), Arc::new(Mutex::new(Session::new())));
    Json(json!({ "session_id": sid }))
}

async fn get_session_handler(
    State(state): State<AppState>,
    Path(sid): Path<String>,
) -> Result<Json<SessionSummary>, (StatusCode, String)> {
    let session = lookup(&state, &sid).await?;
    let session = session.lock().await;

    Ok(Json(SessionSummary {
        session_id: sid,
        view: session.view().clone(),
        turn_counts: session.store.turn_counts(),
    }))
}

async fn select_handler(
    State(state): State<AppState>,
    Path(sid): Path<String>,
    Json(request): Json<SelectRequest>,
) -> Result<Json<SelectResponse>, (StatusCode, String)> {
    let session = lookup(&state, &sid).await?;
    let mut session = session.lock().await;

    // Home -> Chat is the only select transition the router has
    if *session.view() != View::Home {
        return Err((
            StatusCode::CONFLICT,
            "already in a chat; POST back first".into(),
        ));
    }

    let persona = session
        .select(&state.registry, &request.persona_id)
        .map_err(|e| (StatusCode::NOT_FOUND, e.to_string()))?
        .clone();

    let greeting = chat::greeting_for(&persona, &session.store).map(String::from);
    let turns = session
        .store
        .peek(&persona.id)
        .map(|c| c.turns().to_vec())
        .unwrap_or_default();

    Ok(Json(SelectResponse {
        persona_id: persona.id,
        greeting,
        turns,
    }))
}

async fn back_handler(
    State(state): State<AppState>,
    Path(sid): Path<String>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let session = lookup(&state, &sid).await?;
    let mut session = session.lock().await;

    if *session.view() == View::Home {
        return Err((StatusCode::CONFLICT, "already at home".into()));
    }

    session.back();
    Ok(Json(json!({ "view": "home" })))
}

async fn messages_handler(
    State(state): State<AppState>,
    Path(sid): Path<String>,
) -> Result<Json<Vec<Turn>>, (StatusCode, String)> {
    let session = lookup(&state, &sid).await?;
    let session = session.lock().await;

    let Some(persona_id) = session.active_persona() else {
        return Err((StatusCode::CONFLICT, ChatError::NoActivePersona.to_string()));
    };

    let turns = session
        .store
        .peek(persona_id)
        .map(|c| c.turns().to_vec())
        .unwrap_or_default();
    Ok(Json(turns))
}

async fn chat_handler(
    State(state): State<AppState>,
    Path(sid): Path<String>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    if request.message.trim().is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "message must not be empty".into(),
        ));
    }

    let session = lookup(&state, &sid).await?;
    let mut session = session.lock().await;

    let Some(persona_id) = session.active_persona().map(String::from) else {
        return Err((StatusCode::CONFLICT, ChatError::NoActivePersona.to_string()));
    };
    let persona = state
        .registry
        .get(&persona_id)
        .map_err(|e| (StatusCode::NOT_FOUND, e.to_string()))?;

    // Phase one: the user turn is in the store before the gateway call,
    // mirroring the echo-then-respond flow of the terminal UI
    let user = chat::submit_user(&mut session.store, &persona_id, request.message.trim());

    // Phase two: gateway errors come back as the assistant turn's text, so
    // this handler still returns 200 and the conversation continues
    let Some(assistant) =
        chat::resolve_pending(&mut session.store, persona, state.provider.as_ref()).await
    else {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "no pending user turn".into(),
        ));
    };

    Ok(Json(ChatResponse { user, assistant }))
}

async fn lookup(state: &AppState, sid: &str) -> Result<Arc<Mutex<Session>>, (StatusCode, String)> {
    state.session(sid).await.ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            ChatError::SessionNotFound(sid.to_string()).to_string(),
        )
    })
}
