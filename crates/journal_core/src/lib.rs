pub mod analysis;
pub mod archive;
pub mod coach;
pub mod domain;
pub mod guard;
pub mod period;
pub mod ports;
pub mod prompts;
pub mod validation;

pub use domain::{CoachMessage, CoachRole, Entry, NewEntry, NewPrompt, Prompt, User, UserCredentials, WritingKind};
pub use ports::{
    AuthStore, CoachService, DatabaseService, EntryStore, InsertOutcome, PatternAnalysisService, PortError,
    PortResult, PromptGenerationService, PromptStore, TranscriptStore,
};
