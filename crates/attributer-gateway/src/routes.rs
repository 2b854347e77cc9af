//! HTTP surface of the server relay: embedded UI, session gate, generate endpoints.

use std::net::SocketAddr;
use std::sync::Arc;

use attributer_core::{
    run_batch, split_questions, AnsweredQuestion, BatchError, ErrorKind, Responder,
    ResponderError, ResponseSet, SessionGate,
};
use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

const INDEX_HTML: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/index.html"));

/// Shared, read-only gateway state.
pub struct AppState {
    pub responder: Responder,
    pub gate: SessionGate,
    pub base_path: String,
}

/// JSON error body: `{"error": "..."}`, plus the failing question for batch calls.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    question: Option<String>,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            question: None,
        }
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Upstream | ErrorKind::Format => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ResponderError> for ApiError {
    fn from(err: ResponderError) -> Self {
        Self::new(status_for(err.kind()), err.public_message())
    }
}

impl From<BatchError> for ApiError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::Empty => Self::new(StatusCode::BAD_REQUEST, err.to_string()),
            BatchError::Question {
                question, source, ..
            } => Self {
                question: Some(question),
                ..Self::from(source)
            },
            BatchError::Cancelled { .. } => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.question {
            Some(q) => json!({ "error": self.message, "question": q }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

/// String field `key` of a JSON object body, or `None` for anything else.
fn string_field(body: &[u8], key: &str) -> Option<String> {
    serde_json::from_slice::<Value>(body)
        .ok()?
        .get(key)?
        .as_str()
        .map(str::to_string)
}

pub fn router(state: Arc<AppState>) -> Router {
    let base_path = state.base_path.clone();
    let routes = Router::new()
        .route("/", get(serve_ui))
        .route("/health", get(health))
        .route("/api/unlock", post(unlock_handler))
        .route("/api/generate", post(generate_handler))
        .route("/api/generate/batch", post(batch_handler));

    // `nest` only matches the bare prefix; the UI answers on the slash form too.
    let app = if base_path.is_empty() {
        routes
    } else {
        Router::new()
            .nest(&base_path, routes)
            .route(&format!("{}/", base_path), get(serve_ui))
    };
    app.with_state(state)
        .layer(axum::middleware::from_fn(log_requests))
}

/// Method, path and peer only; request bodies carry questions and are never logged.
async fn log_requests(
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    tracing::info!(
        peer = ?connect_info.map(|ConnectInfo(addr)| addr),
        %method,
        %path,
        status = response.status().as_u16(),
        "request"
    );
    response
}

async fn health() -> &'static str {
    "OK"
}

/// Single-page UI; `__BASE_PATH__` lets its fetch calls follow the mount point.
async fn serve_ui(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(INDEX_HTML.replace("__BASE_PATH__", &state.base_path))
}

/// POST /api/unlock: plaintext gate. Obfuscation only; see `SessionGate`.
/// A body without a string `password` is just a wrong password.
async fn unlock_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let password = string_field(&body, "password").unwrap_or_default();
    state
        .gate
        .check(&password)
        .map_err(|e| ApiError::new(StatusCode::UNAUTHORIZED, e.to_string()))?;
    Ok(Json(json!({ "authenticated": true })))
}

/// POST /api/generate: `{question}` in, ResponseSet out.
async fn generate_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ResponseSet>, ApiError> {
    let question = string_field(&body, "question")
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "Question is required"))?;

    let set = state.responder.respond(&question).await.map_err(|e| {
        tracing::error!(error = %e, "generate failed");
        ApiError::from(e)
    })?;
    Ok(Json(set))
}

/// POST /api/generate/batch: `{questions}` (one per line) in, answers in input order out.
/// Fail-fast: the first failing question ends the request.
async fn batch_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Vec<AnsweredQuestion>>, ApiError> {
    let input = string_field(&body, "questions").unwrap_or_default();
    let questions = split_questions(&input);

    let answered = run_batch(&state.responder, &questions, &CancellationToken::new())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "batch failed");
            ApiError::from(e)
        })?;
    Ok(Json(answered))
}
