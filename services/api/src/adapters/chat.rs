//! services/api/src/adapters/chat.rs
//!
//! The one request shape every text-generation adapter sends: a model, an
//! output-token cap, a system instruction, and an ordered list of turns.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use journal_core::domain::{CoachMessage, CoachRole};
use journal_core::ports::{PortError, PortResult};

fn build_error(e: OpenAIError) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn to_request_message(turn: &CoachMessage) -> PortResult<ChatCompletionRequestMessage> {
    let message: ChatCompletionRequestMessage = match turn.role {
        CoachRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(turn.content.as_str())
            .build()
            .map_err(build_error)?
            .into(),
        CoachRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(turn.content.as_str())
            .build()
            .map_err(build_error)?
            .into(),
    };
    Ok(message)
}

/// Sends one chat completion and returns the first textual reply, trimmed.
pub(crate) async fn complete(
    client: &Client<OpenAIConfig>,
    model: &str,
    max_tokens: u32,
    system: &str,
    turns: &[CoachMessage],
) -> PortResult<String> {
    let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(turns.len() + 1);
    messages.push(
        ChatCompletionRequestSystemMessageArgs::default()
            .content(system)
            .build()
            .map_err(build_error)?
            .into(),
    );
    for turn in turns {
        messages.push(to_request_message(turn)?);
    }

    let request = CreateChatCompletionRequestArgs::default()
        .model(model)
        .messages(messages)
        .max_tokens(max_tokens)
        .n(1)
        .build()
        .map_err(build_error)?;

    // Call the API and manually map the error if it occurs, which respects the orphan rule.
    let response = client.chat().create(request).await.map_err(build_error)?;

    response
        .choices
        .into_iter()
        .find_map(|choice| choice.message.content)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| PortError::Unexpected("No text response from API".to_string()))
}
