//! services/api/src/adapters/title_llm.rs
//!
//! This module contains the adapter for the title-summarizing LLM.
//! It implements the `TitleGenerationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;

use doc_chat_core::ports::{PortError, PortResult, TitleGenerationService};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TitleGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiTitleAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiTitleAdapter {
    /// Creates a new `OpenAiTitleAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `TitleGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TitleGenerationService for OpenAiTitleAdapter {
    async fn summarize_query(&self, query: &str) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(
                    "You are a title generation assistant. Summarize the user's query into a \
                     short session title of 5 to 7 words. Respond with ONLY the title, no \
                     quotes, no explanation.",
                )
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!("Summarize this query in 5 to 7 words: {}", query))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(20u32)
            .temperature(0.7)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let title = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| PortError::Unexpected("No title generated".to_string()))?;

        Ok(title.trim().to_string())
    }
}
