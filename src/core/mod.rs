pub mod chat;
pub mod embedding;
pub mod prompt;

pub use crate::domain::model::{ChatMessage, ChatResponse, EmbeddingResponse};
pub use crate::domain::ports::{ChatModel, EmbeddingModel, MessageHistory, SearchProvider};
pub use crate::utils::error::Result;
pub use chat::ChatService;
pub use embedding::EmbeddingService;
