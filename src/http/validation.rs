use crate::domain::model::{ApiChatMessage, ChatMessage, EmbeddingInput, MAX_MESSAGE_CONTENT_CHARS};
use crate::http::error::{ApiError, FieldViolation};
use axum::http::HeaderMap;
use serde_json::json;

pub const USER_ID_HEADER: &str = "user-id";

pub const CHAT_USER_HEADER_MISSING: &str = "O cabeçalho 'user-id' é obrigatório.";
pub const EMBEDDINGS_USER_HEADER_MISSING: &str = "O header user-id é obrigatório.";
pub const EMPTY_MESSAGES: &str = "A lista de mensagens não pode estar vazia.";
pub const EMPTY_EMBEDDING_INPUT: &str = "A entrada não pode estar vazia.";

/// Returns the caller id from the `user-id` header.
pub fn require_user_id(headers: &HeaderMap, missing_detail: &str) -> Result<String, ApiError> {
    match headers.get(USER_ID_HEADER).map(|value| value.to_str()) {
        Some(Ok(value)) => Ok(value.to_string()),
        Some(Err(_)) | None => {
            tracing::error!("Erro ao processar a solicitação: {}", missing_detail);
            Err(ApiError::BadRequest(missing_detail.to_string()))
        }
    }
}

/// Only absent or zero-length text counts as empty; whitespace is content.
fn is_empty(text: Option<&str>) -> bool {
    text.map_or(true, str::is_empty)
}

/// `/chat` messages: all problems are reported together, joined by `"; "`.
pub fn validate_chat_messages(messages: &[ChatMessage]) -> Result<(), ApiError> {
    let mut errors = Vec::new();

    if messages.is_empty() {
        errors.push(EMPTY_MESSAGES.to_string());
    }

    for (i, message) in messages.iter().enumerate() {
        if is_empty(message.content.as_deref()) {
            errors.push(format!(
                "O atributo 'content' da mensagem no índice {} não pode estar vazio para /chat.",
                i
            ));
        }
    }

    into_result(errors)
}

/// Field constraints of `messageContent`, reported as 422 like schema errors.
pub fn check_completion_constraints(messages: &[ApiChatMessage]) -> Result<(), ApiError> {
    let violations: Vec<FieldViolation> = messages
        .iter()
        .enumerate()
        .filter_map(|(i, message)| {
            let loc = vec![
                json!("body"),
                json!("data"),
                json!("messages"),
                json!(i),
                json!("messageContent"),
            ];
            let length = message.message_content.chars().count();
            if length < 1 {
                Some(FieldViolation::new(
                    loc,
                    "String should have at least 1 character",
                    "string_too_short",
                ))
            } else if length > MAX_MESSAGE_CONTENT_CHARS {
                Some(FieldViolation::new(
                    loc,
                    format!(
                        "String should have at most {} characters",
                        MAX_MESSAGE_CONTENT_CHARS
                    ),
                    "string_too_long",
                ))
            } else {
                None
            }
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Unprocessable(violations))
    }
}

/// `/chat/completion` messages.
pub fn validate_completion_messages(messages: &[ApiChatMessage]) -> Result<(), ApiError> {
    let mut errors = Vec::new();

    if messages.is_empty() {
        errors.push(EMPTY_MESSAGES.to_string());
    }

    for (i, message) in messages.iter().enumerate() {
        if is_empty(Some(&message.message_content)) {
            errors.push(format!(
                "O atributo 'messageContent' da mensagem no índice {} não pode estar vazio para /chat/completion.",
                i
            ));
        }
        if message.end_turn_indicator.is_none() {
            errors.push(format!(
                "O atributo 'endTurnIndicator' da mensagem no índice {} não pode ser vazio para /chat/completion.",
                i
            ));
        }
    }

    into_result(errors)
}

pub fn validate_embedding_input(input: &EmbeddingInput) -> Result<(), ApiError> {
    if input.is_empty() {
        return Err(ApiError::BadRequest(EMPTY_EMBEDDING_INPUT.to_string()));
    }
    Ok(())
}

fn into_result(errors: Vec<String>) -> Result<(), ApiError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::BadRequest(errors.join("; ")))
    }
}
