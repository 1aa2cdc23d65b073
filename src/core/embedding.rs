use crate::domain::model::{EmbeddingRequest, EmbeddingResponse};
use crate::domain::ports::EmbeddingModel;
use crate::utils::error::{AppError, Result};
use std::sync::Arc;

pub struct EmbeddingService {
    model: Arc<dyn EmbeddingModel>,
}

impl EmbeddingService {
    pub fn new(model: Arc<dyn EmbeddingModel>) -> Self {
        Self { model }
    }

    /// Embeds the request input as one text. `total_tokens` is the
    /// token usage reported by the embedding deployment.
    pub async fn create_embeddings(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse> {
        if request.input.is_empty() {
            return Err(AppError::ValidationError {
                message: "embedding input is empty".to_string(),
            });
        }

        if let Some(format) = request.encoding_format.as_deref() {
            if format != "float" {
                tracing::debug!("Ignoring encoding_format '{}', returning floats", format);
            }
        }

        let embedding = self
            .model
            .embed(&request.input.to_text(), request.dimensions)
            .await?;

        tracing::info!(
            dimensions = embedding.vector.len(),
            tokens = embedding.prompt_tokens,
            "Embeddings created"
        );

        Ok(EmbeddingResponse {
            embeddings: embedding.vector,
            total_tokens: embedding.prompt_tokens,
        })
    }
}
