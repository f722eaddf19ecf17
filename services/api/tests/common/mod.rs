//! In-memory stand-ins for the datastore and text-generation ports, plus a
//! router wired to them.

#![allow(dead_code)]

use api_lib::config::Config;
use api_lib::adapters::InMemoryTranscriptStore;
use api_lib::web::{build_router, state::AppState};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use http_body_util::BodyExt;
use journal_core::analysis::AnalysisKind;
use journal_core::archive::EntryQuery;
use journal_core::coach::CoachContext;
use journal_core::domain::{CoachMessage, Entry, NewEntry, NewPrompt, Prompt, User, UserCredentials, WritingKind};
use journal_core::ports::{
    AuthStore, CoachService, EntryStore, InsertOutcome, PatternAnalysisService, PortError, PortResult,
    PromptGenerationService, PromptStore,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

//=========================================================================================
// Datastore
//=========================================================================================

#[derive(Default)]
struct Tables {
    users: Vec<(User, String)>,
    sessions: HashMap<String, Uuid>,
    prompts: Vec<Prompt>,
    entries: Vec<Entry>,
}

#[derive(Default)]
pub struct MemoryDb {
    tables: Mutex<Tables>,
    pub entry_writes: AtomicUsize,
}

impl MemoryDb {
    /// Registers a user with an open session and returns (user id, session token).
    pub fn signed_in_user(&self, email: &str) -> (Uuid, String) {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            created_at: Utc::now(),
        };
        let token = Uuid::new_v4().to_string();
        let mut tables = self.tables.lock().unwrap();
        tables.sessions.insert(token.clone(), user.id);
        let id = user.id;
        tables.users.push((user, "unused".to_string()));
        (id, token)
    }

    pub fn insert_entry(&self, user_id: Uuid, kind: WritingKind, text: &str, created_at: DateTime<Utc>) -> Entry {
        let entry = Entry {
            id: Uuid::new_v4(),
            user_id,
            prompt_id: None,
            entry_text: text.to_string(),
            entry_type: kind,
            created_at,
            updated_at: created_at,
        };
        self.tables.lock().unwrap().entries.push(entry.clone());
        entry
    }

    pub fn entry(&self, entry_id: Uuid) -> Option<Entry> {
        self.tables
            .lock()
            .unwrap()
            .entries
            .iter()
            .find(|e| e.id == entry_id)
            .cloned()
    }

    pub fn entry_count(&self) -> usize {
        self.tables.lock().unwrap().entries.len()
    }

    pub fn prompt_count(&self) -> usize {
        self.tables.lock().unwrap().prompts.len()
    }
}

#[async_trait]
impl AuthStore for MemoryDb {
    async fn create_user_with_email(&self, email: &str, hashed_password: &str) -> PortResult<User> {
        let mut tables = self.tables.lock().unwrap();
        if tables.users.iter().any(|(u, _)| u.email == email) {
            return Err(PortError::Conflict(format!("email {} taken", email)));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            created_at: Utc::now(),
        };
        tables.users.push((user.clone(), hashed_password.to_string()));
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let tables = self.tables.lock().unwrap();
        tables
            .users
            .iter()
            .find(|(u, _)| u.email == email)
            .map(|(u, hash)| UserCredentials {
                user_id: u.id,
                email: u.email.clone(),
                hashed_password: hash.clone(),
            })
            .ok_or_else(|| PortError::NotFound(email.to_string()))
    }

    async fn create_auth_session(&self, session_id: &str, user_id: Uuid, _: DateTime<Utc>) -> PortResult<()> {
        self.tables
            .lock()
            .unwrap()
            .sessions
            .insert(session_id.to_string(), user_id);
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        self.tables
            .lock()
            .unwrap()
            .sessions
            .get(session_id)
            .copied()
            .ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.tables.lock().unwrap().sessions.remove(session_id);
        Ok(())
    }
}

#[async_trait]
impl PromptStore for MemoryDb {
    async fn find_prompt(&self, user_id: Uuid, kind: WritingKind, date: NaiveDate) -> PortResult<Option<Prompt>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .prompts
            .iter()
            .find(|p| p.user_id == user_id && p.prompt_type == kind && p.generated_date == date)
            .cloned())
    }

    async fn insert_prompt(&self, prompt: NewPrompt) -> PortResult<InsertOutcome> {
        let mut tables = self.tables.lock().unwrap();
        let taken = tables.prompts.iter().any(|p| {
            p.user_id == prompt.user_id
                && p.prompt_type == prompt.prompt_type
                && p.generated_date == prompt.generated_date
        });
        if taken {
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
        tables.prompts.push(stored.clone());
        Ok(InsertOutcome::Inserted(stored))
    }

    async fn get_prompt_by_id(&self, user_id: Uuid, prompt_id: Uuid) -> PortResult<Option<Prompt>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .prompts
            .iter()
            .find(|p| p.id == prompt_id && p.user_id == user_id)
            .cloned())
    }
}

#[async_trait]
impl EntryStore for MemoryDb {
    async fn create_entry(&self, entry: NewEntry) -> PortResult<Entry> {
        self.entry_writes.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let stored = Entry {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            prompt_id: entry.prompt_id,
            entry_text: entry.entry_text,
            entry_type: entry.entry_type,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().entries.push(stored.clone());
        Ok(stored)
    }

    async fn update_entry_text(&self, user_id: Uuid, entry_id: Uuid, text: &str) -> PortResult<Option<Entry>> {
        self.entry_writes.fetch_add(1, Ordering::SeqCst);
        let mut tables = self.tables.lock().unwrap();
        Ok(tables
            .entries
            .iter_mut()
            .find(|e| e.id == entry_id && e.user_id == user_id)
            .map(|e| {
                e.entry_text = text.to_string();
                e.updated_at = Utc::now();
                e.clone()
            }))
    }

    async fn delete_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.entries.len();
        tables.entries.retain(|e| !(e.id == entry_id && e.user_id == user_id));
        Ok(tables.entries.len() < before)
    }

    async fn list_entries(&self, user_id: Uuid, query: &EntryQuery) -> PortResult<Vec<Entry>> {
        let mut found: Vec<Entry> = self
            .tables
            .lock()
            .unwrap()
            .entries
            .iter()
            .filter(|e| e.user_id == user_id && query.matches(e))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn get_entry_by_id(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<Option<Entry>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .entries
            .iter()
            .find(|e| e.id == entry_id && e.user_id == user_id)
            .cloned())
    }
}

//=========================================================================================
// Text Generation
//=========================================================================================

#[derive(Default)]
pub struct ScriptedGenerator {
    pub calls: AtomicUsize,
    pub failing: AtomicBool,
}

#[async_trait]
impl PromptGenerationService for ScriptedGenerator {
    async fn generate_prompt(&self, kind: WritingKind, period_key: NaiveDate) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("provider down".to_string()));
        }
        Ok(format!("Write about {} for {}", kind, period_key))
    }
}

#[derive(Default)]
pub struct EchoCoach {
    pub calls: AtomicUsize,
}

#[async_trait]
impl CoachService for EchoCoach {
    async fn reply(&self, _context: &CoachContext, transcript: &[CoachMessage]) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("What made you say that? ({} turns)", transcript.len()))
    }
}

#[derive(Default)]
pub struct CountingAnalyst {
    pub calls: AtomicUsize,
}

#[async_trait]
impl PatternAnalysisService for CountingAnalyst {
    async fn analyze(&self, kind: AnalysisKind, formatted_entries: &str) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{:?}: {} chars read", kind, formatted_entries.len()))
    }
}

//=========================================================================================
// Harness
//=========================================================================================

pub struct TestApp {
    pub router: Router,
    pub db: Arc<MemoryDb>,
    pub generator: Arc<ScriptedGenerator>,
    pub coach: Arc<EchoCoach>,
    pub analyst: Arc<CountingAnalyst>,
}

pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://unused".to_string(),
        log_level: tracing::Level::INFO,
        openai_api_key: None,
        openai_base_url: None,
        prompt_model: "test-model".to_string(),
        coach_model: "test-model".to_string(),
        analysis_model: "test-model".to_string(),
        local_offset: FixedOffset::east_opt(0).unwrap(),
        allowed_origin: "http://localhost:3000".to_string(),
        cookie_secure: false,
    }
}

impl TestApp {
    pub fn new() -> Self {
        let db = Arc::new(MemoryDb::default());
        let generator = Arc::new(ScriptedGenerator::default());
        let coach = Arc::new(EchoCoach::default());
        let analyst = Arc::new(CountingAnalyst::default());

        let state = Arc::new(AppState {
            db: db.clone(),
            config: Arc::new(test_config()),
            prompt_adapter: generator.clone(),
            coach_adapter: coach.clone(),
            analysis_adapter: analyst.clone(),
            transcripts: Arc::new(InMemoryTranscriptStore::new()),
        });

        Self {
            router: build_router(state).unwrap(),
            db,
            generator,
            coach,
            analyst,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    with_cookie(Request::get(uri), token).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    with_cookie(Request::delete(uri), token).body(Body::empty()).unwrap()
}

pub fn json(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    with_cookie(Request::builder().method(method).uri(uri), token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn with_cookie(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header(header::COOKIE, format!("session={}", token)),
        None => builder,
    }
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
