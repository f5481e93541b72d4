//! HTTP server for the chat UI

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::controller::{ChatController, SessionSnapshot};
use crate::core::errors::TranslationError;
use crate::core::languages::{self, Language};
use crate::core::models::ChatExchange;
use crate::server::page::INDEX_HTML;

/// Application state
#[derive(Clone)]
pub struct AppState {
    controller: Arc<ChatController>,
}

impl AppState {
    /// Wrap a shared controller
    pub fn new(controller: Arc<ChatController>) -> Self {
        Self { controller }
    }
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
    model_loaded: bool,
}

/// Language catalog response
#[derive(Serialize)]
struct LanguagesResponse {
    object: String,
    data: Vec<Language>,
}

/// Language selection request
#[derive(Deserialize)]
pub struct SelectRequest {
    /// Source language code or name
    pub source_lang: String,
    /// Target language code or name
    pub target_lang: String,
}

/// Language selection response
#[derive(Serialize)]
pub struct SelectResponse {
    /// Resolved source language
    pub source_lang: Language,
    /// Resolved target language
    pub target_lang: Language,
}

/// Chat submission
#[derive(Deserialize)]
pub struct TranslateRequest {
    /// Text to translate; missing counts as empty
    #[serde(default)]
    pub text: String,
    /// Overrides the selected source language
    pub source_lang: Option<String>,
    /// Overrides the selected target language
    pub target_lang: Option<String>,
}

/// Model load response
#[derive(Serialize)]
pub struct LoadResponse {
    /// Always true on success
    pub model_loaded: bool,
    /// Name reported by the engine
    pub model: String,
}

/// History clear response
#[derive(Serialize)]
pub struct ClearResponse {
    /// Number of exchanges removed
    pub cleared: usize,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorDetail,
}

/// Error body shared by every failing endpoint
#[derive(Serialize)]
pub struct ErrorDetail {
    /// Human readable message
    pub message: String,
    /// Machine-readable code, see [`TranslationError::kind`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Error class: invalid_request_error, model_error or api_error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
}

/// Translation error rendered as a JSON envelope with a matching status
pub struct ApiError(TranslationError);

impl From<TranslationError> for ApiError {
    fn from(err: TranslationError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(TranslationError::InvalidRequest {
            message: rejection.body_text(),
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, r#type) = if self.0.is_rejection() {
            (StatusCode::BAD_REQUEST, "invalid_request_error")
        } else {
            match self.0 {
                TranslationError::ModelUnavailable { .. } => {
                    (StatusCode::SERVICE_UNAVAILABLE, "model_error")
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "api_error"),
            }
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                message: self.0.to_string(),
                code: Some(self.0.kind().to_string()),
                r#type: Some(r#type.to_string()),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Chat page
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check handler
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: crate::NAME.to_string(),
        version: crate::VERSION.to_string(),
        model_loaded: state.controller.model_loaded().await,
    })
}

/// Language catalog handler
async fn get_languages() -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        object: "list".to_string(),
        data: languages::catalog().to_vec(),
    })
}

/// Session snapshot handler
async fn get_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.controller.snapshot().await)
}

/// Language selection handler
async fn select_languages(
    State(state): State<AppState>,
    payload: Result<Json<SelectRequest>, JsonRejection>,
) -> Result<Json<SelectResponse>, ApiError> {
    let Json(payload) = payload?;
    let (source, target) = state
        .controller
        .select_languages(&payload.source_lang, &payload.target_lang)
        .await?;

    Ok(Json(SelectResponse {
        source_lang: source.language(),
        target_lang: target.language(),
    }))
}

/// Explicit model load handler
async fn load_model(State(state): State<AppState>) -> Result<Json<LoadResponse>, ApiError> {
    let controller = state.controller.clone();
    // Runs to completion even if the client disconnects
    let model = tokio::spawn(async move { controller.load_model().await })
        .await
        .map_err(|e| TranslationError::model_unavailable(format!("load task failed: {e}")))??;

    Ok(Json(LoadResponse {
        model_loaded: true,
        model,
    }))
}

/// Chat submission handler
async fn translate(
    State(state): State<AppState>,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<ChatExchange>, ApiError> {
    let Json(payload) = payload?;
    let controller = state.controller.clone();
    let exchange = tokio::spawn(async move {
        controller
            .submit(
                &payload.text,
                payload.source_lang.as_deref(),
                payload.target_lang.as_deref(),
            )
            .await
    })
    .await
    .map_err(|e| TranslationError::inference(format!("translation task failed: {e}")))?;

    match exchange {
        Ok(exchange) => Ok(Json(exchange)),
        Err(e) => {
            warn!("Submission rejected: {}", e);
            Err(e.into())
        }
    }
}

/// History clear handler
async fn clear_history(State(state): State<AppState>) -> Json<ClearResponse> {
    Json(ClearResponse {
        cleared: state.controller.clear_history().await,
    })
}

/// Build the router around a controller
pub fn router(controller: Arc<ChatController>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/api/languages", get(get_languages))
        .route("/api/session", get(get_session))
        .route("/api/session/languages", put(select_languages))
        .route("/api/model/load", post(load_model))
        .route("/api/translate", post(translate))
        .route("/api/history", delete(clear_history))
        .with_state(AppState::new(controller))
}

/// Run the HTTP server until Ctrl-C
pub async fn run_server(controller: Arc<ChatController>, host: &str, port: u16) -> anyhow::Result<()> {
    let app = router(controller);

    // Host names are resolved, so "localhost" works as well as an IP
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    let addr: SocketAddr = listener.local_addr()?;

    info!("Starting server on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
