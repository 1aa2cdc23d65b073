//! HTTP surface: the `/api` routes, health check and OpenAPI document.
//!
//! Runs as an Azure Functions custom handler; the host forwards requests to
//! the port named by `FUNCTIONS_CUSTOMHANDLER_PORT`.

pub mod chat;
pub mod embeddings;
pub mod error;
pub mod health;
pub mod openapi;
pub mod validation;

use crate::adapters::{AzureOpenAiClient, AzureSearchClient, InMemoryHistory};
use crate::config::AppConfig;
use crate::core::{ChatService, EmbeddingService};
use crate::utils::error::{AppError, Result};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub embeddings: Arc<EmbeddingService>,
    pub app_version: Arc<str>,
    openapi: Arc<Value>,
}

impl AppState {
    pub fn new(chat: ChatService, embeddings: EmbeddingService, app_version: &str) -> Self {
        Self {
            chat: Arc::new(chat),
            embeddings: Arc::new(embeddings),
            app_version: Arc::from(app_version),
            openapi: Arc::new(openapi::create_openapi()),
        }
    }

    /// Builds the Azure clients once; they are shared by all requests.
    pub fn from_config(config: &AppConfig) -> Self {
        let openai = Arc::new(AzureOpenAiClient::new(
            config.openai.clone(),
            config.http.clone(),
        ));

        let mut search = AzureSearchClient::new(config.search.clone(), config.http.clone());
        if config.search.strategy.is_some() {
            search = search.with_embeddings(openai.clone());
        }

        let mut chat = ChatService::new(
            Arc::new(search),
            openai.clone(),
            config.search.top_results,
        );
        if config.server.chat_history_max_messages > 0 {
            tracing::info!(
                "Chat history enabled, keeping {} messages for up to {} users",
                config.server.chat_history_max_messages,
                config.server.chat_history_max_sessions
            );
            chat = chat.with_history(Arc::new(InMemoryHistory::with_capacity(
                config.server.chat_history_max_messages,
                config.server.chat_history_max_sessions,
            )));
        }

        Self::new(chat, EmbeddingService::new(openai), &config.server.app_version)
    }
}

/// Span for one API call, carrying the caller id and the W3C `traceparent`.
pub(crate) fn request_span(operation: &'static str, headers: &HeaderMap, user_id: &str) -> tracing::Span {
    let traceparent = headers
        .get("traceparent")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    tracing::info_span!(
        "api_request",
        operation = operation,
        user_id = %user_id,
        traceparent = %traceparent
    )
}

async fn openapi_document(State(state): State<AppState>) -> Json<Value> {
    Json(state.openapi.as_ref().clone())
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/chat", post(chat::create_chat_response))
        .route("/chat/completion", post(chat::create_chat_completion))
        .route("/embeddings", post(embeddings::create_embeddings));

    Router::new()
        .nest("/api", api)
        .route("/health", get(health::get_health_check))
        .route("/openapi.json", get(openapi_document))
        .fallback(not_found)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

pub struct HttpServer {
    bind_address: String,
    state: AppState,
}

impl HttpServer {
    pub fn new(bind_address: impl Into<String>, state: AppState) -> Self {
        Self {
            bind_address: bind_address.into(),
            state,
        }
    }

    /// Serves until Ctrl-C.
    pub async fn serve(self) -> Result<()> {
        let addr: SocketAddr = self.bind_address.parse().map_err(|e| AppError::ConfigError {
            message: format!("Invalid bind address '{}': {}", self.bind_address, e),
        })?;

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Listening on http://{}", listener.local_addr()?);

        axum::serve(listener, build_router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
