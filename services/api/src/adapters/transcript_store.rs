//! services/api/src/adapters/transcript_store.rs
//!
//! An in-process `TranscriptStore`. Transcripts live as long as the server
//! process and are never written to the database.

use async_trait::async_trait;
use journal_core::domain::CoachMessage;
use journal_core::ports::{PortResult, TranscriptStore};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryTranscriptStore {
    transcripts: RwLock<HashMap<String, Vec<CoachMessage>>>,
}

impl InMemoryTranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TranscriptStore for InMemoryTranscriptStore {
    async fn load(&self, session_key: &str) -> PortResult<Vec<CoachMessage>> {
        let transcripts = self.transcripts.read().await;
        Ok(transcripts.get(session_key).cloned().unwrap_or_default())
    }

    async fn save(&self, session_key: &str, transcript: &[CoachMessage]) -> PortResult<()> {
        self.transcripts
            .write()
            .await
            .insert(session_key.to_string(), transcript.to_vec());
        Ok(())
    }

    async fn clear(&self, session_key: &str) -> PortResult<()> {
        self.transcripts.write().await.remove(session_key);
        Ok(())
    }
}
