use crate::domain::model::{Completion, Embedding, PromptMessage, SearchDocument};
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Returns at most `top` documents relevant to `text`.
    async fn search(&self, text: &str, top: usize) -> Result<Vec<SearchDocument>>;
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[PromptMessage]) -> Result<Completion>;
}

#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    async fn embed(&self, text: &str, dimensions: Option<u32>) -> Result<Embedding>;
}

/// Conversation log keyed by session (the caller's `user-id`).
pub trait MessageHistory: Send + Sync {
    fn add_messages(&self, session: &str, messages: Vec<PromptMessage>);
    fn messages(&self, session: &str) -> Vec<PromptMessage>;
    fn clear(&self, session: &str);
}
