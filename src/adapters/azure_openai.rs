use crate::adapters::http::UpstreamClient;
use crate::config::{HttpClientConfig, OpenAiConfig};
use crate::domain::model::{ChatUsage, Completion, Embedding, FinishReason, PromptMessage};
use crate::domain::ports::{ChatModel, EmbeddingModel};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Azure OpenAI deployment client for chat completions and embeddings.
pub struct AzureOpenAiClient {
    http: UpstreamClient,
    config: OpenAiConfig,
}

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest<'a> {
    messages: &'a [PromptMessage],
    model: &'a str,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    id: String,
    choices: Vec<UpstreamChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct UpstreamChoice {
    #[serde(default)]
    message: Option<UpstreamMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpstreamMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
    #[serde(default)]
    usage: Option<EmbeddingsUsage>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsUsage {
    prompt_tokens: u32,
}

impl AzureOpenAiClient {
    pub fn new(config: OpenAiConfig, http: HttpClientConfig) -> Self {
        Self {
            http: UpstreamClient::new("Azure OpenAI", http),
            config,
        }
    }

    fn deployment_url(&self, deployment: &str, operation: &str) -> String {
        format!(
            "{}/openai/deployments/{}/{}?api-version={}",
            self.config.endpoint.trim_end_matches('/'),
            deployment,
            operation,
            self.config.api_version
        )
    }

    fn protocol_error(&self, message: &str) -> AppError {
        AppError::UpstreamProtocolError {
            service: self.http.service().to_string(),
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl ChatModel for AzureOpenAiClient {
    async fn complete(&self, messages: &[PromptMessage]) -> Result<Completion> {
        let url = self.deployment_url(&self.config.deployment_name, "chat/completions");
        let request = ChatCompletionsRequest {
            messages,
            model: &self.config.model,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
        };

        let response: ChatCompletionsResponse =
            self.http.post_json(&url, &self.config.api_key, &request).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| self.protocol_error("chat completion has no choices"))?;

        let finish_reason = choice.finish_reason.as_deref().and_then(FinishReason::from_upstream);
        if finish_reason == Some(FinishReason::ContentFilter) {
            tracing::warn!("Completion {} was cut by the content filter", response.id);
        }

        Ok(Completion {
            id: response.id,
            content: choice.message.and_then(|m| m.content).unwrap_or_default(),
            finish_reason,
            usage: response.usage.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl EmbeddingModel for AzureOpenAiClient {
    async fn embed(&self, text: &str, dimensions: Option<u32>) -> Result<Embedding> {
        let url = self.deployment_url(&self.config.embeddings_deployment_name, "embeddings");
        let request = EmbeddingsRequest {
            input: text,
            dimensions,
        };

        let response: EmbeddingsResponse =
            self.http.post_json(&url, &self.config.api_key, &request).await?;

        let data = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| self.protocol_error("embeddings response has no data"))?;

        Ok(Embedding {
            vector: data.embedding,
            prompt_tokens: response.usage.map(|u| u.prompt_tokens).unwrap_or(0),
        })
    }
}
