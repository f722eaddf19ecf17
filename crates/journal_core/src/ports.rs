//! crates/journal_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the datastore and the text-generation provider.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::analysis::AnalysisKind;
use crate::archive::EntryQuery;
use crate::coach::CoachContext;
use crate::domain::{CoachMessage, Entry, NewEntry, NewPrompt, Prompt, User, UserCredentials, WritingKind};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Result of attempting to persist a generated prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted(Prompt),
    /// Another caller already holds the (user, kind, date) slot.
    Conflict,
}

//=========================================================================================
// Datastore Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Fails with `PortError::Conflict` when the email is already registered.
    async fn create_user_with_email(&self, email: &str, hashed_password: &str) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Returns the owning user id of a live (unexpired) session.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;
}

#[async_trait]
pub trait PromptStore: Send + Sync {
    async fn find_prompt(
        &self,
        user_id: Uuid,
        kind: WritingKind,
        generated_date: NaiveDate,
    ) -> PortResult<Option<Prompt>>;

    async fn insert_prompt(&self, prompt: NewPrompt) -> PortResult<InsertOutcome>;

    async fn get_prompt_by_id(&self, user_id: Uuid, prompt_id: Uuid) -> PortResult<Option<Prompt>>;
}

/// Every entry operation is scoped to `user_id`; rows belonging to other
/// users are invisible.
#[async_trait]
pub trait EntryStore: Send + Sync {
    async fn create_entry(&self, entry: NewEntry) -> PortResult<Entry>;

    /// Returns `None` when no row with this id belongs to the user.
    async fn update_entry_text(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        entry_text: &str,
    ) -> PortResult<Option<Entry>>;

    /// Returns whether a row was removed.
    async fn delete_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<bool>;

    /// Newest first.
    async fn list_entries(&self, user_id: Uuid, query: &EntryQuery) -> PortResult<Vec<Entry>>;

    async fn get_entry_by_id(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<Option<Entry>>;
}

/// The full datastore, as handed to the web layer.
pub trait DatabaseService: AuthStore + PromptStore + EntryStore {}

impl<T: AuthStore + PromptStore + EntryStore> DatabaseService for T {}

//=========================================================================================
// Text-Generation Ports
//=========================================================================================

#[async_trait]
pub trait PromptGenerationService: Send + Sync {
    /// Produces the text of a new prompt for the period starting at `period_key`.
    async fn generate_prompt(&self, kind: WritingKind, period_key: NaiveDate) -> PortResult<String>;
}

#[async_trait]
pub trait CoachService: Send + Sync {
    /// Produces the coach's next reply to a transcript ending in a user turn.
    async fn reply(&self, context: &CoachContext, transcript: &[CoachMessage]) -> PortResult<String>;
}

#[async_trait]
pub trait PatternAnalysisService: Send + Sync {
    /// Analyses an already formatted block of entries.
    async fn analyze(&self, kind: AnalysisKind, formatted_entries: &str) -> PortResult<String>;
}

//=========================================================================================
// Key-Value Port
//=========================================================================================

/// Persists coach transcripts by writing-session key.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// An unknown key yields an empty transcript.
    async fn load(&self, session_key: &str) -> PortResult<Vec<CoachMessage>>;

    async fn save(&self, session_key: &str, transcript: &[CoachMessage]) -> PortResult<()>;

    async fn clear(&self, session_key: &str) -> PortResult<()>;
}
