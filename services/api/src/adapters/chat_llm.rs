//! services/api/src/adapters/chat_llm.rs
//!
//! This module contains the adapter for the main generative chat LLM.
//! It implements the `GenerativeService` port from the `core` crate.

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

use doc_chat_core::ports::{GenerativeService, PortError, PortResult};

/// Fixed sampling parameters for every generation call.
const TEMPERATURE: f32 = 1.0;
const TOP_P: f32 = 0.95;
const MAX_OUTPUT_TOKENS: u32 = 8192;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `GenerativeService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiChatAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiChatAdapter {
    /// Creates a new `OpenAiChatAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `GenerativeService` Trait Implementation
//=========================================================================================

#[async_trait]
impl GenerativeService for OpenAiChatAdapter {
    /// Sends the message with the given system instruction and a fresh, empty
    /// prior-turn history. Conversation state lives in the relational store,
    /// not with the provider.
    async fn complete(&self, system_instruction: &str, message: &str) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_instruction)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(message)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(TEMPERATURE)
            .top_p(TOP_P)
            .max_tokens(MAX_OUTPUT_TOKENS)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Chat LLM response contained no text content".to_string())
            })?;

        Ok(content)
    }
}
