//! crates/journal_core/src/prompts.rs
//!
//! Fetch-or-generate for period prompts.
//!
//! A prompt is created lazily the first time a user asks for it in a given
//! period. There is no lock around the read and the write: the datastore's
//! uniqueness constraint on (user, kind, date) decides which of two racing
//! inserts survives, and the loser re-reads the winner's row.

use chrono::NaiveDate;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{NewPrompt, Prompt, WritingKind};
use crate::ports::{InsertOutcome, PortResult, PromptGenerationService, PromptStore};

/// Returns the prompt for `(user_id, kind, period_key)`, generating and
/// storing it on first request. `None` means the prompt is unavailable right now.
pub async fn obtain_period_prompt<S: PromptStore + ?Sized>(
    store: &S,
    generator: &dyn PromptGenerationService,
    user_id: Uuid,
    kind: WritingKind,
    period_key: NaiveDate,
) -> Option<Prompt> {
    // 1. Lookup
    match store.find_prompt(user_id, kind, period_key).await {
        Ok(Some(existing)) => return Some(existing),
        Ok(None) => {}
        Err(e) => error!("Failed to look up {} prompt for {}: {:?}", kind, period_key, e),
    }

    // 2. Attempt insert
    let prompt_text = match generator.generate_prompt(kind, period_key).await {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to generate {} prompt: {:?}", kind, e);
            return None;
        }
    };

    let new_prompt = NewPrompt {
        user_id,
        prompt_text,
        prompt_type: kind,
        generated_date: period_key,
    };

    match store.insert_prompt(new_prompt).await {
        Ok(InsertOutcome::Inserted(prompt)) => {
            info!("Stored new {} prompt {} for {}", kind, prompt.id, period_key);
            Some(prompt)
        }
        // 3. Reconcile on conflict
        Ok(InsertOutcome::Conflict) => {
            warn!(
                "A concurrent request already stored the {} prompt for {}; discarding generated text",
                kind, period_key
            );
            reconcile(store, user_id, kind, period_key).await
        }
        Err(e) => {
            error!("Failed to save {} prompt: {:?}", kind, e);
            None
        }
    }
}

async fn reconcile<S: PromptStore + ?Sized>(
    store: &S,
    user_id: Uuid,
    kind: WritingKind,
    period_key: NaiveDate,
) -> Option<Prompt> {
    match store.find_prompt(user_id, kind, period_key).await {
        Ok(found) => found,
        Err(e) => {
            error!("Failed to re-read {} prompt after conflict: {:?}", kind, e);
            None
        }
    }
}

/// Fetches a prompt the caller owns.
pub async fn prompt_by_id<S: PromptStore + ?Sized>(
    store: &S,
    user_id: Uuid,
    prompt_id: Uuid,
) -> PortResult<Option<Prompt>> {
    store.get_prompt_by_id(user_id, prompt_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PortError;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryPromptStore {
        rows: Mutex<Vec<Prompt>>,
        fail_insert: bool,
        fail_find: bool,
    }

    #[async_trait]
    impl PromptStore for MemoryPromptStore {
        async fn find_prompt(
            &self,
            user_id: Uuid,
            kind: WritingKind,
            generated_date: NaiveDate,
        ) -> PortResult<Option<Prompt>> {
            if self.fail_find {
                return Err(PortError::Unexpected("read timed out".to_string()));
            }
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .find(|p| p.user_id == user_id && p.prompt_type == kind && p.generated_date == generated_date)
                .cloned())
        }

        async fn insert_prompt(&self, prompt: NewPrompt) -> PortResult<InsertOutcome> {
            if self.fail_insert {
                return Err(PortError::Unexpected("connection reset".to_string()));
            }
            let mut rows = self.rows.lock().unwrap();
            if rows.iter().any(|p| {
                p.user_id == prompt.user_id
                    && p.prompt_type == prompt.prompt_type
                    && p.generated_date == prompt.generated_date
            }) {
                return Ok(InsertOutcome::Conflict);
            }
            let stored = Prompt {
                id: Uuid::new_v4(),
                user_id: prompt.user_id,
                prompt_text: prompt.prompt_text,
                prompt_type: prompt.prompt_type,
                generated_date: prompt.generated_date,
                created_at: Utc::now(),
            };
            rows.push(stored.clone());
            Ok(InsertOutcome::Inserted(stored))
        }

        async fn get_prompt_by_id(&self, user_id: Uuid, prompt_id: Uuid) -> PortResult<Option<Prompt>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().find(|p| p.id == prompt_id && p.user_id == user_id).cloned())
        }
    }

    #[derive(Default)]
    struct CountingGenerator {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl PromptGenerationService for CountingGenerator {
        async fn generate_prompt(&self, kind: WritingKind, period_key: NaiveDate) -> PortResult<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            // Let a concurrent caller run its lookup before this one inserts.
            tokio::task::yield_now().await;
            if self.fail {
                return Err(PortError::Unexpected("rate limited".to_string()));
            }
            Ok(format!("{} prompt #{} for {}", kind, n, period_key))
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[tokio::test]
    async fn second_call_reuses_stored_prompt() {
        let store = MemoryPromptStore::default();
        let generator = CountingGenerator::default();
        let user = Uuid::new_v4();

        let first = obtain_period_prompt(&store, &generator, user, WritingKind::Daily, day())
            .await
            .unwrap();
        let second = obtain_period_prompt(&store, &generator, user, WritingKind::Daily, day())
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn keys_are_scoped_by_user_and_kind() {
        let store = MemoryPromptStore::default();
        let generator = CountingGenerator::default();
        let user = Uuid::new_v4();

        let daily = obtain_period_prompt(&store, &generator, user, WritingKind::Daily, day()).await.unwrap();
        let fiction = obtain_period_prompt(&store, &generator, user, WritingKind::Fiction, day()).await.unwrap();
        let other = obtain_period_prompt(&store, &generator, Uuid::new_v4(), WritingKind::Daily, day())
            .await
            .unwrap();

        assert_ne!(daily.id, fiction.id);
        assert_ne!(daily.id, other.id);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn concurrent_first_calls_share_one_row() {
        let store = MemoryPromptStore::default();
        let generator = CountingGenerator::default();
        let user = Uuid::new_v4();

        let (a, b) = futures::future::join(
            obtain_period_prompt(&store, &generator, user, WritingKind::Fiction, day()),
            obtain_period_prompt(&store, &generator, user, WritingKind::Fiction, day()),
        )
        .await;

        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.id, b.id);
        assert_eq!(a.prompt_text, b.prompt_text);
        assert_eq!(store.rows.lock().unwrap().len(), 1);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn generation_failure_is_unavailable_not_fatal() {
        let store = MemoryPromptStore::default();
        let generator = CountingGenerator {
            fail: true,
            ..Default::default()
        };

        let prompt = obtain_period_prompt(&store, &generator, Uuid::new_v4(), WritingKind::Daily, day()).await;

        assert!(prompt.is_none());
        assert!(store.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_failure_is_unavailable() {
        let store = MemoryPromptStore {
            fail_insert: true,
            ..Default::default()
        };
        let generator = CountingGenerator::default();

        let prompt = obtain_period_prompt(&store, &generator, Uuid::new_v4(), WritingKind::Daily, day()).await;
        assert!(prompt.is_none());
    }

    #[tokio::test]
    async fn prompt_by_id_hides_other_users_prompts() {
        let store = MemoryPromptStore::default();
        let generator = CountingGenerator::default();
        let owner = Uuid::new_v4();
        let prompt = obtain_period_prompt(&store, &generator, owner, WritingKind::Daily, day()).await.unwrap();

        assert!(prompt_by_id(&store, owner, prompt.id).await.unwrap().is_some());
        assert!(prompt_by_id(&store, Uuid::new_v4(), prompt.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lookup_error_falls_through_to_generation() {
        let store = MemoryPromptStore {
            fail_find: true,
            ..Default::default()
        };
        let generator = CountingGenerator::default();

        let prompt = obtain_period_prompt(&store, &generator, Uuid::new_v4(), WritingKind::Daily, day()).await;

        assert!(prompt.is_some());
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_reread_after_conflict_is_unavailable() {
        let user = Uuid::new_v4();
        let store = MemoryPromptStore {
            fail_find: true,
            ..Default::default()
        };
        store.rows.lock().unwrap().push(Prompt {
            id: Uuid::new_v4(),
            user_id: user,
            prompt_text: "Write about a locked door.".to_string(),
            prompt_type: WritingKind::Fiction,
            generated_date: day(),
            created_at: Utc::now(),
        });
        let generator = CountingGenerator::default();

        let prompt = obtain_period_prompt(&store, &generator, user, WritingKind::Fiction, day()).await;

        assert!(prompt.is_none());
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.rows.lock().unwrap().len(), 1);
    }
}
