//! services/api/src/adapters/analysis_llm.rs
//!
//! This module contains the adapter for the pattern-analysis LLM.
//! It implements the `PatternAnalysisService` port from the `core` crate.

const THEMES_INSTRUCTIONS: &str = r#"You are a literary analyst helping a fiction writer discover patterns in their work.

Analyze the provided writing entries for thematic connections. Look for:
- Recurring themes and motifs
- Emotional undertones that appear across entries
- Subject matter that the writer gravitates toward
- Philosophical or existential questions being explored

Be specific and cite examples from the entries. Organize your findings clearly.
Keep your analysis insightful but concise (around 300-400 words)."#;

const CHARACTERS_INSTRUCTIONS: &str = r#"You are a literary analyst helping a fiction writer discover patterns in their work.

Analyze the provided writing entries for recurring characters and settings. Look for:
- Characters that appear multiple times (even if unnamed, look for similar character types)
- Settings or locations that recur
- Relationship dynamics that repeat
- Character archetypes the writer is drawn to

Be specific and cite examples from the entries. Note any characters or settings that could be developed further.
Keep your analysis insightful but concise (around 300-400 words)."#;

const STYLE_INSTRUCTIONS: &str = r#"You are a literary analyst helping a fiction writer understand their craft.

Analyze the provided writing entries for stylistic patterns. Look for:
- Distinctive voice characteristics
- Sentence structure tendencies (long/short, simple/complex)
- Use of sensory detail and imagery
- Dialogue patterns and strengths
- Point of view preferences
- Pacing tendencies

Be specific and cite examples. Note both strengths to build on and areas for experimentation.
Keep your analysis insightful but concise (around 300-400 words)."#;

const STORIES_INSTRUCTIONS: &str = r#"You are a literary analyst helping a fiction writer find story potential in their work.

Analyze the provided writing entries for potential story connections. Look for:
- Entries that could be combined into a larger narrative
- Characters or situations that could be developed into short stories
- Unfinished threads worth exploring
- Scenes that could serve as story openings or pivotal moments

Be specific about which entries connect and how. Suggest 2-3 concrete story ideas based on the material.
Keep your analysis insightful but concise (around 300-400 words)."#;

const ANALYSIS_MAX_TOKENS: u32 = 1000;

use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use journal_core::analysis::AnalysisKind;
use journal_core::domain::CoachMessage;
use journal_core::ports::{PatternAnalysisService, PortResult};

use crate::adapters::chat::complete;

fn instructions_for(kind: AnalysisKind) -> &'static str {
    match kind {
        AnalysisKind::Themes => THEMES_INSTRUCTIONS,
        AnalysisKind::Characters => CHARACTERS_INSTRUCTIONS,
        AnalysisKind::Style => STYLE_INSTRUCTIONS,
        AnalysisKind::Stories => STORIES_INSTRUCTIONS,
    }
}

/// An adapter that implements `PatternAnalysisService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiAnalysisAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiAnalysisAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl PatternAnalysisService for OpenAiAnalysisAdapter {
    async fn analyze(&self, kind: AnalysisKind, formatted_entries: &str) -> PortResult<String> {
        let request = CoachMessage::user(format!(
            "Here are my writing entries. Please analyze them:\n\n{}",
            formatted_entries
        ));
        complete(
            &self.client,
            &self.model,
            ANALYSIS_MAX_TOKENS,
            instructions_for(kind),
            &[request],
        )
        .await
    }
}
