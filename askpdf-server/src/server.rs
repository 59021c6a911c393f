use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use askpdf_rag::{ErrorKind, RagError, RagPipeline};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post},
};
use serde_json::json;
use thiserror::Error;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use crate::{
    config::{AppConfig, DEFAULT_HOST, DEFAULT_MAX_UPLOAD_MB, DEFAULT_PORT, DEFAULT_SESSION_TTL},
    protocol::{
        AskRequest, AskResponse, DocumentResponse, ErrorResponse, SessionCreateResponse,
        UploadQuery,
    },
    session::{SessionManager, SessionState},
};

const DEFAULT_DOCUMENT_NAME: &str = "document.pdf";

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionManager,
    pub pipeline: Arc<RagPipeline>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(pipeline: RagPipeline, max_upload_bytes: usize) -> Self {
        Self { sessions: SessionManager::default(), pipeline: Arc::new(pipeline), max_upload_bytes }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    /// Idle time after which a session is dropped. Zero keeps sessions until deleted.
    pub session_ttl: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }
}

impl From<&AppConfig> for ServerConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            max_upload_bytes: config.max_upload_bytes,
            session_ttl: config.session_ttl,
        }
    }
}

/// A failed request, rendered as `{"error": ..., "kind": ...}`.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self { status: StatusCode::NOT_FOUND, kind: "not_found", message: message.into() }
    }

    pub fn no_context(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            kind: ErrorKind::NoContext.as_str(),
            message: message.into(),
        }
    }

    pub fn bad_request(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, kind: "bad_request", message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            kind: ErrorKind::Internal.as_str(),
            message: message.into(),
        }
    }
}

impl From<RagError> for ApiError {
    fn from(err: RagError) -> Self {
        let kind = err.kind();
        let status = match kind {
            ErrorKind::InvalidDocument | ErrorKind::NoContext | ErrorKind::Declined => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ErrorKind::Credential => StatusCode::UNAUTHORIZED,
            ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, kind: kind.as_str(), message: err.to_string() }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(kind = self.kind, error = %self.message, "request failed");
        } else {
            warn!(kind = self.kind, error = %self.message, "request rejected");
        }
        let body = ErrorResponse { error: self.message, kind: self.kind.to_string() };
        (self.status, Json(body)).into_response()
    }
}

pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let limit = state.max_upload_bytes;

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/session", post(create_session))
        .route("/api/session/{session_id}", delete(delete_session))
        .route("/api/session/{session_id}/document", post(upload_document).delete(clear_document))
        .route("/api/session/{session_id}/ask", post(ask))
        .with_state(state)
        .layer(DefaultBodyLimit::max(limit))
        .layer(RequestBodyLimitLayer::new(limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn run_server(config: ServerConfig, pipeline: RagPipeline) -> anyhow::Result<()> {
    let state = AppState::new(pipeline, config.max_upload_bytes);
    if !config.session_ttl.is_zero() {
        state.sessions.spawn_idle_sweep(config.session_ttl);
    }
    let app = app_router(state);
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| "invalid host/port for askpdf server")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("askpdf listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index() -> impl IntoResponse {
    Html(include_str!("../ui/index.html"))
}

async fn health() -> impl IntoResponse {
    Json(json!({"status":"ok","service":"askpdf"}))
}

async fn create_session(State(state): State<AppState>) -> impl IntoResponse {
    let session_id = state.sessions.create_session().await;
    info!(session_id = %session_id, "session created");
    Json(SessionCreateResponse { session_id })
}

async fn delete_session(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    if state.sessions.remove_session(&session_id).await {
        info!(session_id = %session_id, "session closed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found(&session_id))
    }
}

async fn upload_document(
    Path(session_id): Path<String>,
    Query(query): Query<UploadQuery>,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<DocumentResponse>, ApiError> {
    let session = find_session(&state, &session_id).await?;
    let name = query
        .name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DOCUMENT_NAME.to_string());

    // One interaction per session at a time.
    let mut slot = session.lock().await;

    let pipeline = state.pipeline.clone();
    let document = tokio::task::spawn_blocking(move || pipeline.load_pdf(&name, &body))
        .await
        .map_err(|e| ApiError::internal(format!("PDF extraction task failed: {e}")))??;

    let index = state.pipeline.build_index(&document).await?;
    let response = DocumentResponse::new(&index, document.page_count, document.char_count());
    let replaced = slot.replace(index);

    info!(
        session_id = %session_id,
        document.id = %response.document_id,
        document.name = %response.name,
        page_count = response.page_count,
        chunk_count = response.chunk_count,
        replaced = replaced.is_some(),
        "document indexed"
    );
    Ok(Json(response))
}

async fn clear_document(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let session = find_session(&state, &session_id).await?;
    let removed = session.lock().await.clear();
    info!(session_id = %session_id, removed = removed.is_some(), "document cleared");
    Ok(StatusCode::NO_CONTENT)
}

async fn ask(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiError> {
    let session = find_session(&state, &session_id).await?;
    let Json(request) = payload?;
    let slot = session.lock().await;
    let index = slot
        .index
        .clone()
        .ok_or_else(|| ApiError::no_context("upload a PDF before asking questions"))?;

    let answer = state.pipeline.ask(&index, &request.question).await?;
    info!(
        session_id = %session_id,
        document.name = index.document_name(),
        source_count = answer.sources.len(),
        "question answered"
    );
    Ok(Json(AskResponse::from(answer)))
}

async fn find_session(state: &AppState, session_id: &str) -> Result<Arc<SessionState>, ApiError> {
    state.sessions.get(session_id).await.ok_or_else(|| session_not_found(session_id))
}

fn session_not_found(session_id: &str) -> ApiError {
    ApiError::not_found(format!("session '{session_id}' does not exist"))
}
