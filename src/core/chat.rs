use crate::core::prompt;
use crate::domain::model::{
    ApiChatMessage, ChatChoice, ChatCompletionChoice, ChatCompletionChoiceCommon,
    ChatCompletionResponse, ChatCompletionResponseCommon, ChatMessage, ChatResponse, ChatRole,
    Completion, DataChatCompletionResponse, PromptMessage,
};
use crate::domain::ports::{ChatModel, MessageHistory, SearchProvider};
use crate::utils::error::{AppError, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;

/// Searches in flight at once for one conversation.
pub const SEARCH_CONCURRENCY: usize = 4;

/// Answers support questions with a chat model grounded on search results.
pub struct ChatService {
    search: Arc<dyn SearchProvider>,
    model: Arc<dyn ChatModel>,
    history: Option<Arc<dyn MessageHistory>>,
    top_results: usize,
}

impl ChatService {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        model: Arc<dyn ChatModel>,
        top_results: usize,
    ) -> Self {
        Self {
            search,
            model,
            history: None,
            top_results,
        }
    }

    pub fn with_history(mut self, history: Arc<dyn MessageHistory>) -> Self {
        self.history = Some(history);
        self
    }

    /// `/chat` flavour: returns the OpenAI-like response shape.
    pub async fn get_chat_completion(
        &self,
        session: &str,
        messages: &[ChatMessage],
    ) -> Result<ChatResponse> {
        let completion = self.complete_conversation(session, messages).await?;

        Ok(ChatResponse {
            choices: vec![ChatChoice {
                finish_reason: completion.finish_reason,
                index: 0,
                message: ChatMessage::new(ChatRole::Assistant, completion.content),
            }],
            created: chrono::Utc::now().timestamp(),
            id: Some(completion.id),
            usage: completion.usage,
        })
    }

    /// `/chat/completion` flavour: returns the enveloped camelCase shape.
    pub async fn get_chat_completion_v2(
        &self,
        session: &str,
        messages: &[ApiChatMessage],
    ) -> Result<ChatCompletionResponse> {
        let chat_messages: Vec<ChatMessage> = messages.iter().map(ChatMessage::from).collect();
        let completion = self.complete_conversation(session, &chat_messages).await?;

        Ok(ChatCompletionResponse {
            data: DataChatCompletionResponse {
                details: ChatCompletionResponseCommon {
                    id_completion: completion.id,
                    object_type: "completion".to_string(),
                    created_date_time: chrono::Utc::now().timestamp(),
                    usage: completion.usage.into(),
                },
                choices: vec![ChatCompletionChoice {
                    chat_completion_choice_common: ChatCompletionChoiceCommon {
                        index_option: 0,
                        finish_reason: completion.finish_reason,
                    },
                    message: ApiChatMessage {
                        role_name: ChatRole::Assistant,
                        message_content: completion.content,
                        end_turn_indicator: Some(true),
                    },
                }],
            },
        })
    }

    /// Every message is used as a search query; only the last one is sent
    /// to the model as the user's question.
    async fn complete_conversation(
        &self,
        session: &str,
        messages: &[ChatMessage],
    ) -> Result<Completion> {
        let question = messages
            .last()
            .map(|m| m.text().to_string())
            .ok_or_else(|| AppError::ValidationError {
                message: "conversation has no messages".to_string(),
            })?;

        let context = self.retrieve_search_context(messages).await?;
        let history = self
            .history
            .as_ref()
            .map(|h| h.messages(session))
            .unwrap_or_default();
        let prompt = prompt::create_prompt(&context, history, &question);

        tracing::debug!(
            "Invoking chat model with {} prompt messages and {} context chars",
            prompt.len(),
            context.chars().count()
        );
        let completion = self.model.complete(&prompt).await?;

        tracing::info!(
            completion_id = %completion.id,
            prompt_tokens = completion.usage.prompt_tokens,
            completion_tokens = completion.usage.completion_tokens,
            "Chat completion generated"
        );

        if let Some(history) = &self.history {
            history.add_messages(
                session,
                vec![
                    PromptMessage::user(question),
                    PromptMessage::assistant(completion.content.clone()),
                ],
            );
        }

        Ok(completion)
    }

    /// Searches the index once per message and assembles the grounding context.
    pub async fn retrieve_search_context(&self, messages: &[ChatMessage]) -> Result<String> {
        let searches: Vec<_> = messages
            .iter()
            .map(|message| self.search.search(message.text(), self.top_results))
            .collect();
        let results: Vec<_> = stream::iter(searches)
            .buffered(SEARCH_CONCURRENCY)
            .try_collect()
            .await?;

        Ok(prompt::build_context(results.iter().flatten()))
    }
}
