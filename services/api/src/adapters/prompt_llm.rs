//! services/api/src/adapters/prompt_llm.rs
//!
//! This module contains the adapter for the prompt-writing LLM.
//! It implements the `PromptGenerationService` port from the `core` crate.

const DAILY_PROMPT_INSTRUCTIONS: &str = r#"You are a creative writing coach helping a fiction writer develop their craft through daily practice.

Generate a single writing prompt that:
- Focuses on a specific craft element (dialogue, sensory detail, perspective, character voice, setting, tension, etc.)
- Is reflective or observational but intentionally craft-focused
- Can be completed in 10-30 minutes
- Encourages noticing and capturing details from life that could feed into fiction

Keep the prompt to 2-3 sentences. Be specific enough to spark ideas but open enough for personal interpretation.

Do NOT include any preamble or explanation. Just output the prompt itself."#;

const FICTION_PROMPT_INSTRUCTIONS: &str = r#"You are a creative writing coach helping a fiction writer build material for short stories.

Generate a single fiction writing prompt that:
- Could develop into a short story or become part of one
- Focuses on story elements: character studies, compelling settings, interesting conflicts, pivotal moments
- Is open-ended with no length constraints
- Sparks imagination while leaving room for the writer's own direction

Keep the prompt to 2-4 sentences. Create something that excites the imagination.

Do NOT include any preamble or explanation. Just output the prompt itself."#;

const DAILY_MAX_TOKENS: u32 = 300;
const FICTION_MAX_TOKENS: u32 = 400;

use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use chrono::NaiveDate;
use journal_core::domain::{CoachMessage, WritingKind};
use journal_core::ports::{PortResult, PromptGenerationService};
use tracing::info;

use crate::adapters::chat::complete;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `PromptGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiPromptAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiPromptAdapter {
    /// Creates a new `OpenAiPromptAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

/// The instruction, the single user turn, and the token cap for a prompt kind.
pub fn prompt_request(kind: WritingKind, period_key: NaiveDate) -> (&'static str, String, u32) {
    match kind {
        WritingKind::Daily => (
            DAILY_PROMPT_INSTRUCTIONS,
            format!(
                "Generate a daily writing prompt for {}. Focus on a craft element that would be valuable to practice.",
                period_key.format("%A, %B %-d")
            ),
            DAILY_MAX_TOKENS,
        ),
        WritingKind::Fiction => (
            FICTION_PROMPT_INSTRUCTIONS,
            "Generate a weekly fiction writing prompt that could inspire a short story.".to_string(),
            FICTION_MAX_TOKENS,
        ),
    }
}

//=========================================================================================
// `PromptGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl PromptGenerationService for OpenAiPromptAdapter {
    async fn generate_prompt(&self, kind: WritingKind, period_key: NaiveDate) -> PortResult<String> {
        let (instructions, user_turn, max_tokens) = prompt_request(kind, period_key);
        info!("Generating {} prompt for {}", kind, period_key);
        complete(
            &self.client,
            &self.model,
            max_tokens,
            instructions,
            &[CoachMessage::user(user_turn)],
        )
        .await
    }
}
