//! services/api/src/adapters/coach_llm.rs
//!
//! This module contains the adapter for the writing-coach LLM.
//! It implements the `CoachService` port from the `core` crate.

const COACH_INSTRUCTIONS: &str = r#"You are a curious, supportive writing coach helping a fiction writer during their creative process. Your role is to help them think through their writing by asking thoughtful questions, never by telling them what to write.

Your approach:
- Ask open-ended questions that spark reflection and discovery
- Help the writer notice what's already interesting in their work
- Offer "what if" explorations to open new possibilities
- When they're stuck, help them find their own way forward through questions
- Be warm and encouraging, but not effusive

What you never do:
- Never suggest specific words, sentences, or rewrites
- Never tell them what to write or how to write it
- Never give prescriptive feedback like "you should..." or "try writing..."
- Never be preachy or lecture about craft

Keep your responses concise, usually 1-3 sentences with a question or two. You're a thinking partner, not a teacher delivering lessons.

You have access to:
1. The writing prompt they're working from
2. What they've written so far (if anything)

Use this context to ask relevant, specific questions about their work."#;

const COACH_MAX_TOKENS: u32 = 300;

use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use journal_core::coach::{frame_transcript, CoachContext};
use journal_core::domain::CoachMessage;
use journal_core::ports::{CoachService, PortResult};

use crate::adapters::chat::complete;

/// An adapter that implements `CoachService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiCoachAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCoachAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl CoachService for OpenAiCoachAdapter {
    async fn reply(&self, context: &CoachContext, transcript: &[CoachMessage]) -> PortResult<String> {
        let framed = frame_transcript(context, transcript);
        complete(&self.client, &self.model, COACH_MAX_TOKENS, COACH_INSTRUCTIONS, &framed).await
    }
}
