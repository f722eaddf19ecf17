//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the datastore ports from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use journal_core::archive::EntryQuery;
use journal_core::domain::{Entry, NewEntry, NewPrompt, Prompt, User, UserCredentials, WritingKind};
use journal_core::ports::{AuthStore, EntryStore, InsertOutcome, PortError, PortResult, PromptStore};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

const PROMPT_COLUMNS: &str = "id, user_id, prompt_text, prompt_type, generated_date, created_at";
const ENTRY_COLUMNS: &str = "id, user_id, prompt_id, entry_text, entry_type, created_at, updated_at";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the datastore ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn parse_kind(raw: &str) -> PortResult<WritingKind> {
    raw.parse::<WritingKind>()
        .map_err(|e| PortError::Unexpected(e.to_string()))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    email: String,
    created_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct PromptRecord {
    id: Uuid,
    user_id: Uuid,
    prompt_text: String,
    prompt_type: String,
    generated_date: NaiveDate,
    created_at: DateTime<Utc>,
}
impl PromptRecord {
    fn to_domain(self) -> PortResult<Prompt> {
        Ok(Prompt {
            id: self.id,
            user_id: self.user_id,
            prompt_text: self.prompt_text,
            prompt_type: parse_kind(&self.prompt_type)?,
            generated_date: self.generated_date,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct EntryRecord {
    id: Uuid,
    user_id: Uuid,
    prompt_id: Option<Uuid>,
    entry_text: String,
    entry_type: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl EntryRecord {
    fn to_domain(self) -> PortResult<Entry> {
        Ok(Entry {
            id: self.id,
            user_id: self.user_id,
            prompt_id: self.prompt_id,
            entry_text: self.entry_text,
            entry_type: parse_kind(&self.entry_type)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

//=========================================================================================
// `AuthStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl AuthStore for DbAdapter {
    async fn create_user_with_email(&self, email: &str, hashed_password: &str) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, email, hashed_password) VALUES ($1, $2, $3) RETURNING id, email, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                PortError::Conflict(format!("User {} already exists", email))
            } else {
                unexpected(e)
            }
        })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", email)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let user_id: Option<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > now()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        user_id.ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}

//=========================================================================================
// `PromptStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl PromptStore for DbAdapter {
    async fn find_prompt(
        &self,
        user_id: Uuid,
        kind: WritingKind,
        generated_date: NaiveDate,
    ) -> PortResult<Option<Prompt>> {
        let record = sqlx::query_as::<_, PromptRecord>(&format!(
            "SELECT {PROMPT_COLUMNS} FROM prompts WHERE user_id = $1 AND prompt_type = $2 AND generated_date = $3"
        ))
        .bind(user_id)
        .bind(kind.as_str())
        .bind(generated_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(PromptRecord::to_domain).transpose()
    }

    async fn insert_prompt(&self, prompt: NewPrompt) -> PortResult<InsertOutcome> {
        let result = sqlx::query_as::<_, PromptRecord>(&format!(
            "INSERT INTO prompts (id, user_id, prompt_text, prompt_type, generated_date) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {PROMPT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(prompt.user_id)
        .bind(&prompt.prompt_text)
        .bind(prompt.prompt_type.as_str())
        .bind(prompt.generated_date)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(record) => Ok(InsertOutcome::Inserted(record.to_domain()?)),
            Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::Conflict),
            Err(e) => Err(unexpected(e)),
        }
    }

    async fn get_prompt_by_id(&self, user_id: Uuid, prompt_id: Uuid) -> PortResult<Option<Prompt>> {
        let record = sqlx::query_as::<_, PromptRecord>(&format!(
            "SELECT {PROMPT_COLUMNS} FROM prompts WHERE id = $1 AND user_id = $2"
        ))
        .bind(prompt_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(PromptRecord::to_domain).transpose()
    }
}

//=========================================================================================
// `EntryStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl EntryStore for DbAdapter {
    async fn create_entry(&self, entry: NewEntry) -> PortResult<Entry> {
        let record = sqlx::query_as::<_, EntryRecord>(&format!(
            "INSERT INTO entries (id, user_id, prompt_id, entry_text, entry_type) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(entry.user_id)
        .bind(entry.prompt_id)
        .bind(&entry.entry_text)
        .bind(entry.entry_type.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        record.to_domain()
    }

    async fn update_entry_text(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        entry_text: &str,
    ) -> PortResult<Option<Entry>> {
        let record = sqlx::query_as::<_, EntryRecord>(&format!(
            "UPDATE entries SET entry_text = $1, updated_at = now() \
             WHERE id = $2 AND user_id = $3 RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(entry_text)
        .bind(entry_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(EntryRecord::to_domain).transpose()
    }

    async fn delete_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<bool> {
        let result = sqlx::query("DELETE FROM entries WHERE id = $1 AND user_id = $2")
            .bind(entry_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_entries(&self, user_id: Uuid, query: &EntryQuery) -> PortResult<Vec<Entry>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE user_id = "));
        builder.push_bind(user_id);
        if let Some(kind) = query.kind {
            builder.push(" AND entry_type = ").push_bind(kind.as_str());
        }
        if let Some(from) = query.created_from {
            builder.push(" AND created_at >= ").push_bind(from);
        }
        if let Some(before) = query.created_before {
            builder.push(" AND created_at < ").push_bind(before);
        }
        builder.push(" ORDER BY created_at DESC");

        let records = builder
            .build_query_as::<EntryRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        records.into_iter().map(EntryRecord::to_domain).collect()
    }

    async fn get_entry_by_id(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<Option<Entry>> {
        let record = sqlx::query_as::<_, EntryRecord>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE id = $1 AND user_id = $2"
        ))
        .bind(entry_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(EntryRecord::to_domain).transpose()
    }
}
