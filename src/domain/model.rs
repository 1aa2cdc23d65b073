use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Upper bound on `messageContent`, in characters.
pub const MAX_MESSAGE_CONTENT_CHARS: usize = 8000;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
    Ai,
    Tool,
}

impl ChatRole {
    pub const ALL: [ChatRole; 5] = [
        ChatRole::User,
        ChatRole::Assistant,
        ChatRole::System,
        ChatRole::Ai,
        ChatRole::Tool,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
            ChatRole::System => "system",
            ChatRole::Ai => "ai",
            ChatRole::Tool => "tool",
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub content: Option<String>,
    pub role: ChatRole,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            role,
        }
    }

    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

fn default_end_turn() -> Option<bool> {
    Some(true)
}

/// Message shape of the `/chat/completion` contract.
///
/// A missing `endTurnIndicator` defaults to `true`; an explicit `null`
/// deserializes to `None` so request validation can reject it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiChatMessage {
    #[serde(rename = "roleName", alias = "role_name")]
    pub role_name: ChatRole,
    #[serde(rename = "messageContent", alias = "message_content")]
    pub message_content: String,
    #[serde(
        rename = "endTurnIndicator",
        alias = "end_turn_indicator",
        default = "default_end_turn"
    )]
    pub end_turn_indicator: Option<bool>,
}

impl From<&ApiChatMessage> for ChatMessage {
    fn from(message: &ApiChatMessage) -> Self {
        ChatMessage {
            content: Some(message.message_content.clone()),
            role: message.role_name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
}

impl FinishReason {
    /// Maps the upstream string; reasons outside the public contract
    /// (`tool_calls`, `function_call`, ...) are dropped.
    pub fn from_upstream(value: &str) -> Option<Self> {
        match value {
            "stop" => Some(FinishReason::Stop),
            "length" => Some(FinishReason::Length),
            "content_filter" => Some(FinishReason::ContentFilter),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatChoice {
    pub finish_reason: Option<FinishReason>,
    pub index: u32,
    pub message: ChatMessage,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatUsage {
    #[serde(alias = "completionTokens")]
    pub completion_tokens: u32,
    #[serde(alias = "promptTokens")]
    pub prompt_tokens: u32,
    #[serde(alias = "totalTokens")]
    pub total_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub stream: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
    #[serde(alias = "createdDateTime")]
    pub created: i64,
    pub id: Option<String>,
    pub usage: ChatUsage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequestCommon {
    #[serde(rename = "streamIndicator", alias = "stream_indicator", default)]
    pub stream_indicator: bool,
    #[serde(rename = "userId", alias = "user_id")]
    pub user_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataChatCompletionRequest {
    pub params: ChatCompletionRequestCommon,
    pub messages: Vec<ApiChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub data: DataChatCompletionRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiChatUsage {
    #[serde(rename = "completionTokenCount", alias = "completion_token_count")]
    pub completion_token_count: u32,
    #[serde(rename = "promptTokenCount", alias = "prompt_token_count")]
    pub prompt_token_count: u32,
    #[serde(rename = "totalTokenCount", alias = "total_token_count")]
    pub total_token_count: u32,
}

impl From<ChatUsage> for ApiChatUsage {
    fn from(usage: ChatUsage) -> Self {
        Self {
            completion_token_count: usage.completion_tokens,
            prompt_token_count: usage.prompt_tokens,
            total_token_count: usage.total_tokens,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatCompletionChoiceCommon {
    #[serde(rename = "indexOption", alias = "index_option")]
    pub index_option: u32,
    #[serde(rename = "finishReason", alias = "finish_reason", default)]
    pub finish_reason: Option<FinishReason>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionChoice {
    #[serde(
        rename = "chatCompletionChoiceCommon",
        alias = "chat_completion_choice_common"
    )]
    pub chat_completion_choice_common: ChatCompletionChoiceCommon,
    pub message: ApiChatMessage,
}

fn default_object_type() -> String {
    "completion".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionResponseCommon {
    #[serde(rename = "idCompletion", alias = "id_completion")]
    pub id_completion: String,
    #[serde(
        rename = "objectType",
        alias = "object_type",
        default = "default_object_type"
    )]
    pub object_type: String,
    #[serde(rename = "createdDateTime", alias = "created_date_time")]
    pub created_date_time: i64,
    pub usage: ApiChatUsage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataChatCompletionResponse {
    pub details: ChatCompletionResponseCommon,
    pub choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub data: DataChatCompletionResponse,
}

/// `input` of an embeddings request: one text or a batch of texts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmbeddingInput {
    Text(String),
    Batch(Vec<String>),
}

impl EmbeddingInput {
    pub fn is_empty(&self) -> bool {
        match self {
            EmbeddingInput::Text(text) => text.is_empty(),
            EmbeddingInput::Batch(items) => items.is_empty(),
        }
    }

    /// Collapses the input into the single text that gets embedded.
    pub fn to_text(&self) -> String {
        match self {
            EmbeddingInput::Text(text) => text.clone(),
            EmbeddingInput::Batch(items) => items.join("\n"),
        }
    }
}

fn default_encoding_format() -> Option<String> {
    Some("float".to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    pub input: EmbeddingInput,
    #[serde(default = "default_encoding_format")]
    pub encoding_format: Option<String>,
    #[serde(default)]
    pub dimensions: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    pub embeddings: Vec<f32>,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub service_status: Option<String>,
    pub dependencies_status: Option<String>,
    pub app_version: Option<String>,
}

/// How the search index is queried for grounding context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    Hybrid,
    SemanticHybrid,
    Similarity,
}

impl SearchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchStrategy::Hybrid => "hybrid",
            SearchStrategy::SemanticHybrid => "semantic_hybrid",
            SearchStrategy::Similarity => "similarity",
        }
    }
}

impl FromStr for SearchStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hybrid" => Ok(SearchStrategy::Hybrid),
            "semantic_hybrid" => Ok(SearchStrategy::SemanticHybrid),
            "similarity" => Ok(SearchStrategy::Similarity),
            other => Err(format!(
                "unknown search strategy '{}', expected hybrid, semantic_hybrid or similarity",
                other
            )),
        }
    }
}

/// A document returned by the search index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDocument {
    pub content: String,
    #[serde(default)]
    pub sourcepage: Option<String>,
}

/// Role of a message sent to the chat model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::Assistant,
            content: content.into(),
        }
    }
}

/// Result of a single chat model invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub id: String,
    pub content: String,
    pub finish_reason: Option<FinishReason>,
    pub usage: ChatUsage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub vector: Vec<f32>,
    pub prompt_tokens: u32,
}
