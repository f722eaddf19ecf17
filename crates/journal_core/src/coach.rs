//! crates/journal_core/src/coach.rs
//!
//! The writing coach conversation: transcript keys, situational framing,
//! and one user/assistant exchange against an injected transcript store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::domain::{CoachMessage, WritingKind};
use crate::ports::{CoachService, PortError, TranscriptStore};
use crate::validation::{validate_coach_message, ValidationError};

/// Greeting the coach is framed as having opened the conversation with.
pub const COACH_GREETING: &str =
    "I'm here whenever you'd like to think through your writing. What's on your mind?";

/// What the writer is working on when they talk to the coach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachContext {
    pub prompt_text: String,
    #[serde(default)]
    pub current_writing: String,
    pub entry_type: WritingKind,
}

/// Identifies a writing session: the prompt id when there is one, otherwise
/// the kind and the day.
pub fn session_key(prompt_id: Option<Uuid>, kind: WritingKind, today: NaiveDate) -> String {
    match prompt_id {
        Some(id) => id.to_string(),
        None => format!("{}-{}", kind, today.format("%Y-%m-%d")),
    }
}

/// The key a transcript is stored under. Session keys repeat across users
/// (`daily-2026-10-19`), so the owner is part of the key.
pub fn storage_key(user_id: Uuid, session_key: &str) -> String {
    format!("coach-chat-{}-{}", user_id, session_key)
}

/// Prepends the situational context and the coach's greeting to a transcript.
pub fn frame_transcript(context: &CoachContext, transcript: &[CoachMessage]) -> Vec<CoachMessage> {
    let writing = if context.current_writing.trim().is_empty() {
        "\nThey haven't started writing yet.".to_string()
    } else {
        format!("\nWhat they've written so far:\n---\n{}\n---", context.current_writing)
    };
    let context_info = format!(
        "[Context for this session]\nPrompt type: {}\nWriting prompt: \"{}\"\n{}",
        context.entry_type, context.prompt_text, writing
    );

    let mut framed = Vec::with_capacity(transcript.len() + 2);
    framed.push(CoachMessage::user(context_info));
    framed.push(CoachMessage::assistant(COACH_GREETING));
    framed.extend_from_slice(transcript);
    framed
}

#[derive(Debug, thiserror::Error)]
pub enum CoachError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Port(#[from] PortError),
}

/// The outcome of one exchange with the coach.
#[derive(Debug, Clone, Serialize)]
pub struct CoachExchange {
    pub response: String,
    pub transcript: Vec<CoachMessage>,
}

/// Appends `message` to the stored transcript, asks the coach, and stores the
/// reply. Nothing is written if the coach call fails.
pub async fn send_coach_message(
    store: &dyn TranscriptStore,
    coach: &dyn CoachService,
    user_id: Uuid,
    session_key: &str,
    message: &str,
    context: &CoachContext,
) -> Result<CoachExchange, CoachError> {
    validate_coach_message(message)?;

    let key = storage_key(user_id, session_key);
    let mut transcript = store.load(&key).await?;
    transcript.push(CoachMessage::user(message.trim()));

    let response = coach.reply(context, &transcript).await.map_err(|e| {
        error!("Coach chat error: {:?}", e);
        e
    })?;

    transcript.push(CoachMessage::assistant(response.clone()));
    store.save(&key, &transcript).await?;

    Ok(CoachExchange { response, transcript })
}

pub async fn load_transcript(
    store: &dyn TranscriptStore,
    user_id: Uuid,
    session_key: &str,
) -> Result<Vec<CoachMessage>, PortError> {
    store.load(&storage_key(user_id, session_key)).await
}

pub async fn clear_transcript(
    store: &dyn TranscriptStore,
    user_id: Uuid,
    session_key: &str,
) -> Result<(), PortError> {
    store.clear(&storage_key(user_id, session_key)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CoachRole;
    use crate::ports::PortResult;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapStore(Mutex<HashMap<String, Vec<CoachMessage>>>);

    #[async_trait]
    impl TranscriptStore for MapStore {
        async fn load(&self, session_key: &str) -> PortResult<Vec<CoachMessage>> {
            Ok(self.0.lock().unwrap().get(session_key).cloned().unwrap_or_default())
        }

        async fn save(&self, session_key: &str, transcript: &[CoachMessage]) -> PortResult<()> {
            self.0.lock().unwrap().insert(session_key.to_string(), transcript.to_vec());
            Ok(())
        }

        async fn clear(&self, session_key: &str) -> PortResult<()> {
            self.0.lock().unwrap().remove(session_key);
            Ok(())
        }
    }

    /// Echoes how many turns it was shown.
    #[derive(Default)]
    struct EchoCoach {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl CoachService for EchoCoach {
        async fn reply(&self, _context: &CoachContext, transcript: &[CoachMessage]) -> PortResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PortError::Unexpected("overloaded".to_string()));
            }
            Ok(format!("seen {} turns", transcript.len()))
        }
    }

    fn writer() -> Uuid {
        Uuid::from_u128(7)
    }

    fn context() -> CoachContext {
        CoachContext {
            prompt_text: "Describe a door.".to_string(),
            current_writing: String::new(),
            entry_type: WritingKind::Fiction,
        }
    }

    #[test]
    fn session_key_prefers_prompt_id() {
        let id = Uuid::new_v4();
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(session_key(Some(id), WritingKind::Daily, today), id.to_string());
        assert_eq!(session_key(None, WritingKind::Fiction, today), "fiction-2026-10-19");
        assert_eq!(
            storage_key(id, "fiction-2026-10-19"),
            format!("coach-chat-{}-fiction-2026-10-19", id)
        );
    }

    #[test]
    fn framing_prepends_context_and_greeting() {
        let transcript = vec![CoachMessage::user("I'm stuck.")];
        let framed = frame_transcript(&context(), &transcript);

        assert_eq!(framed.len(), 3);
        assert_eq!(framed[0].role, CoachRole::User);
        assert!(framed[0].content.contains("Prompt type: fiction"));
        assert!(framed[0].content.contains("Writing prompt: \"Describe a door.\""));
        assert!(framed[0].content.contains("They haven't started writing yet."));
        assert_eq!(framed[1], CoachMessage::assistant(COACH_GREETING));
        assert_eq!(framed[2], transcript[0]);
    }

    #[test]
    fn framing_includes_current_writing() {
        let mut ctx = context();
        ctx.current_writing = "The door was blue.".to_string();
        let framed = frame_transcript(&ctx, &[]);
        assert!(framed[0].content.contains("What they've written so far:\n---\nThe door was blue.\n---"));
    }

    #[tokio::test]
    async fn exchange_appends_both_turns() {
        let store = MapStore::default();
        let coach = EchoCoach::default();

        let first = send_coach_message(&store, &coach, writer(), "k", "Hello", &context()).await.unwrap();
        assert_eq!(first.response, "seen 1 turns");
        let second = send_coach_message(&store, &coach, writer(), "k", "Again", &context()).await.unwrap();
        assert_eq!(second.response, "seen 3 turns");

        let stored = load_transcript(&store, writer(), "k").await.unwrap();
        assert_eq!(stored.len(), 4);
        assert_eq!(stored[3], CoachMessage::assistant("seen 3 turns"));
    }

    #[tokio::test]
    async fn empty_message_never_reaches_coach() {
        let store = MapStore::default();
        let coach = EchoCoach::default();

        let err = send_coach_message(&store, &coach, writer(), "k", "   ", &context()).await.unwrap_err();
        assert!(matches!(err, CoachError::Validation(ValidationError::EmptyMessage)));
        assert_eq!(coach.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_reply_leaves_transcript_untouched() {
        let store = MapStore::default();
        let coach = EchoCoach {
            fail: true,
            ..Default::default()
        };

        assert!(send_coach_message(&store, &coach, writer(), "k", "Hello", &context()).await.is_err());
        assert!(load_transcript(&store, writer(), "k").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_removes_transcript() {
        let store = MapStore::default();
        let coach = EchoCoach::default();
        send_coach_message(&store, &coach, writer(), "k", "Hello", &context()).await.unwrap();

        clear_transcript(&store, writer(), "k").await.unwrap();
        assert!(load_transcript(&store, writer(), "k").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn same_session_key_is_private_per_user() {
        let store = MapStore::default();
        let coach = EchoCoach::default();
        let other = Uuid::from_u128(8);

        send_coach_message(&store, &coach, writer(), "daily-2026-10-19", "my draft", &context())
            .await
            .unwrap();

        assert!(load_transcript(&store, other, "daily-2026-10-19").await.unwrap().is_empty());
        clear_transcript(&store, other, "daily-2026-10-19").await.unwrap();
        assert_eq!(load_transcript(&store, writer(), "daily-2026-10-19").await.unwrap().len(), 2);
    }
}
