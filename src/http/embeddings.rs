use crate::domain::model::EmbeddingRequest;
use crate::http::error::ApiError;
use crate::http::validation::{
    require_user_id, validate_embedding_input, EMBEDDINGS_USER_HEADER_MISSING,
};
use crate::http::{request_span, AppState};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::Instrument;

const EMBEDDINGS_FAILURE: &str = "Erro ao criar embeddings.";

/// `POST /api/embeddings`, answered with 201.
pub async fn create_embeddings(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<EmbeddingRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let user_id = require_user_id(&headers, EMBEDDINGS_USER_HEADER_MISSING)?;
    let Json(request) = payload?;
    validate_embedding_input(&request.input)?;
    let span = request_span("create_embeddings", &headers, &user_id);

    async move {
        let response = state
            .embeddings
            .create_embeddings(&request)
            .await
            .map_err(|e| {
                tracing::error!(category = ?e.category(), "Erro ao criar embeddings: {}", e);
                ApiError::Internal(EMBEDDINGS_FAILURE.to_string())
            })?;

        Ok((StatusCode::CREATED, Json(response)).into_response())
    }
    .instrument(span)
    .await
}
