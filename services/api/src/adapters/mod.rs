pub mod analysis_llm;
mod chat;
pub mod coach_llm;
pub mod db;
pub mod prompt_llm;
pub mod transcript_store;

pub use analysis_llm::OpenAiAnalysisAdapter;
pub use coach_llm::OpenAiCoachAdapter;
pub use db::DbAdapter;
pub use prompt_llm::OpenAiPromptAdapter;
pub use transcript_store::InMemoryTranscriptStore;
