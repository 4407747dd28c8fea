//! API routes

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::conversation::Message;
use crate::core::ChatError;
use crate::language::Label;
use crate::session::{AuthError, SessionState, SessionStore, SessionView};
use crate::AppState;

const COOKIE_NAME: &str = "hh_session";

const INDEX_HTML: &str = include_str!("../../static/index.html");

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub label: Label,
    pub messages: Vec<Message>,
}

/// Handler error rendered as `{"error": "..."}`
#[derive(Debug)]
pub enum ApiError {
    Auth(AuthError),
    Chat(ChatError),
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::Auth(e)
    }
}

impl From<ChatError> for ApiError {
    fn from(e: ChatError) -> Self {
        ApiError::Chat(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Auth(e) => (StatusCode::UNAUTHORIZED, e.to_string()),
            ApiError::Chat(e @ ChatError::NotLoggedIn) => (StatusCode::UNAUTHORIZED, e.to_string()),
            ApiError::Chat(e @ ChatError::EmptyMessage) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Chat(e @ ChatError::Upstream(_)) => (StatusCode::BAD_GATEWAY, e.to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /api/session` — what the page should render right now.
async fn session(State(state): State<AppState>, jar: CookieJar) -> Json<SessionView> {
    let existing = match session_token(&jar) {
        Some(token) => state.sessions.get(&token).await,
        None => None,
    };

    let view = match existing {
        Some(session) => session.lock().await.view(),
        None => SessionState::new().view(),
    };
    Json(view)
}

/// `POST /api/login` — non-empty credential gate; sets the session cookie.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionView>), ApiError> {
    let existing = match session_token(&jar) {
        Some(token) => state
            .sessions
            .get(&token)
            .await
            .map(|session| (token, session)),
        None => None,
    };

    let (token, view) = match existing {
        Some((token, session)) => {
            let mut session = session.lock().await;
            session.login(&request.username, &request.password)?;
            (token, session.view())
        }
        None => {
            // Sessions are only registered once a login succeeds.
            let mut fresh = SessionState::new();
            fresh.login(&request.username, &request.password)?;
            let view = fresh.view();
            let token = SessionStore::new_token();
            state.sessions.insert(&token, fresh).await;
            let live = state.sessions.len().await;
            tracing::debug!(sessions = live, "session registered");
            (token, view)
        }
    };

    tracing::info!(username = %view.username, "user logged in");
    Ok((jar.add(session_cookie(token)), Json(view)))
}

/// `POST /api/logout` — drop the session and its history.
async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    if let Some(token) = session_token(&jar) {
        if let Some(session) = state.sessions.get(&token).await {
            session.lock().await.logout();
        }
        state.sessions.remove(&token).await;
    }
    let cleared = Cookie::build((COOKIE_NAME, "")).path("/").build();
    (jar.remove(cleared), StatusCode::NO_CONTENT)
}

/// `POST /api/chat` — run one turn for the caller's session.
async fn chat(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let token = session_token(&jar).ok_or(ChatError::NotLoggedIn)?;
    let session = state
        .sessions
        .get(&token)
        .await
        .ok_or(ChatError::NotLoggedIn)?;

    let mut session = session.lock().await;
    let turn = state.chat_engine.submit(&mut session, &request.message).await?;

    Ok(Json(ChatResponse {
        reply: turn.reply,
        label: turn.label,
        messages: session.conversation().messages().to_vec(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/session", get(session))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/chat", post(chat))
}
