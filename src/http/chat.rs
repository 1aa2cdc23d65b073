use crate::domain::model::{ChatCompletionRequest, ChatRequest};
use crate::http::error::ApiError;
use crate::http::validation::{
    check_completion_constraints, require_user_id, validate_chat_messages,
    validate_completion_messages, CHAT_USER_HEADER_MISSING,
};
use crate::http::{request_span, AppState};
use crate::utils::error::AppError;
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::convert::Infallible;
use tracing::Instrument;

const CHAT_FAILURE: &str = "Erro ao processar a solicitação de chat.";
const COMPLETION_FAILURE: &str = "Erro ao processar a solicitação de conclusão de chat.";

fn internal(error: AppError, detail: &str) -> ApiError {
    tracing::error!(
        category = ?error.category(),
        severity = ?error.severity(),
        "{}: {}",
        detail.trim_end_matches('.'),
        error
    );
    ApiError::Internal(detail.to_string())
}

/// `POST /api/chat`
pub async fn create_chat_response(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let user_id = require_user_id(&headers, CHAT_USER_HEADER_MISSING)?;
    let Json(request) = payload?;
    let span = request_span("create_chat_response", &headers, &user_id);

    async move {
        if let Err(error) = validate_chat_messages(&request.messages) {
            tracing::error!("Erro ao processar a solicitação de chat: {:?}", error);
            return Err(error);
        }

        let response = state
            .chat
            .get_chat_completion(&user_id, &request.messages)
            .await
            .map_err(|e| internal(e, CHAT_FAILURE))?;

        if request.stream {
            let chunks: Vec<Result<String, Infallible>> = response
                .choices
                .into_iter()
                .filter_map(|choice| choice.message.content)
                .map(Ok)
                .collect();
            let body = Body::from_stream(futures::stream::iter(chunks));
            return Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                body,
            )
                .into_response());
        }

        Ok((StatusCode::OK, Json(response)).into_response())
    }
    .instrument(span)
    .await
}

/// `POST /api/chat/completion`
pub async fn create_chat_completion(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ChatCompletionRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let user_id = require_user_id(&headers, CHAT_USER_HEADER_MISSING)?;
    let Json(request) = payload?;
    check_completion_constraints(&request.data.messages)?;
    let span = request_span("create_chat_completion", &headers, &user_id);

    async move {
        if let Err(error) = validate_completion_messages(&request.data.messages) {
            tracing::error!(
                "Erro ao processar a solicitação de conclusão de chat: {:?}",
                error
            );
            return Err(error);
        }

        if request.data.params.stream_indicator {
            tracing::debug!("streamIndicator requested; answering with a single JSON body");
        }

        let response = state
            .chat
            .get_chat_completion_v2(&user_id, &request.data.messages)
            .await
            .map_err(|e| internal(e, COMPLETION_FAILURE))?;

        Ok((StatusCode::OK, Json(response)).into_response())
    }
    .instrument(span)
    .await
}
