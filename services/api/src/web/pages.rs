//! services/api/src/web/pages.rs
//!
//! Page routes. Each returns the data its page renders; markup is the
//! client's business.

use axum::{
    extract::{Extension, State},
    http::header,
    response::{IntoResponse, Json},
};
use chrono::Datelike;
use journal_core::analysis::AnalysisKind;
use journal_core::archive::{export_entries, filter_entries, ArchiveFilter, EntryQuery, ExportFormat};
use journal_core::coach::{load_transcript, session_key};
use journal_core::domain::{CoachMessage, Entry, Prompt, WritingKind};
use journal_core::period::{days_until_next_fiction_prompt, period_key, FICTION_WEEK_START};
use journal_core::prompts::{obtain_period_prompt, prompt_by_id};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::web::error::ActionError;
use crate::web::extract::{PathParam, QueryParams};
use crate::web::state::{AppState, CurrentUser};

//=========================================================================================
// Home
//=========================================================================================

#[derive(Serialize)]
pub struct HomePage {
    pub date: String,
    pub daily_prompt: Option<Prompt>,
    pub fiction_prompt: Option<Prompt>,
    pub is_saturday: bool,
    pub days_until_next_fiction: u32,
}

/// GET / - today's prompts
pub async fn home_page(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Json<HomePage> {
    let today = state.config.today();
    let db = &*state.db;
    let generator = &*state.prompt_adapter;

    let (daily_prompt, fiction_prompt) = tokio::join!(
        obtain_period_prompt(db, generator, user.user_id, WritingKind::Daily, period_key(WritingKind::Daily, today)),
        obtain_period_prompt(db, generator, user.user_id, WritingKind::Fiction, period_key(WritingKind::Fiction, today)),
    );

    Json(HomePage {
        date: today.format("%A, %B %-d, %Y").to_string(),
        daily_prompt,
        fiction_prompt,
        is_saturday: today.weekday() == FICTION_WEEK_START,
        days_until_next_fiction: days_until_next_fiction_prompt(today),
    })
}

//=========================================================================================
// Composer
//=========================================================================================

#[derive(Deserialize)]
pub struct WriteQuery {
    #[serde(rename = "type")]
    pub kind: Option<WritingKind>,
    #[serde(rename = "promptId")]
    pub prompt_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct WritePage {
    pub entry_type: WritingKind,
    pub prompt: Option<Prompt>,
    /// Key for the coach transcript of this writing session.
    pub session_key: String,
    pub transcript: Vec<CoachMessage>,
}

/// GET /write?type&promptId - composer
pub async fn write_page(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    QueryParams(query): QueryParams<WriteQuery>,
) -> Result<Json<WritePage>, ActionError> {
    let entry_type = query.kind.unwrap_or(WritingKind::Daily);

    let prompt = match query.prompt_id {
        Some(id) => prompt_by_id(&*state.db, user.user_id, id).await?,
        None => None,
    };

    let key = session_key(prompt.as_ref().map(|p| p.id), entry_type, state.config.today());
    let transcript = load_transcript(&*state.transcripts, user.user_id, &key).await?;

    Ok(Json(WritePage {
        entry_type,
        prompt,
        session_key: key,
        transcript,
    }))
}

//=========================================================================================
// Archive
//=========================================================================================

#[derive(Serialize)]
pub struct ArchivePage {
    pub entries: Vec<Entry>,
    /// Entries before filtering.
    pub total: usize,
    pub filters_active: bool,
}

/// GET /archive?type&from&to
pub async fn archive_page(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    QueryParams(filter): QueryParams<ArchiveFilter>,
) -> Result<Json<ArchivePage>, ActionError> {
    let all = state.db.list_entries(user.user_id, &EntryQuery::all()).await?;
    let entries = filter_entries(&all, &filter, state.config.local_offset);

    Ok(Json(ArchivePage {
        entries,
        total: all.len(),
        filters_active: filter.is_active(),
    }))
}

/// Read alongside the `ArchiveFilter` from the same query string.
#[derive(Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: ExportFormat,
}

/// GET /archive/export?type&from&to&format - file download
pub async fn archive_export(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    QueryParams(filter): QueryParams<ArchiveFilter>,
    QueryParams(query): QueryParams<ExportQuery>,
) -> Result<impl IntoResponse, ActionError> {
    let all = state.db.list_entries(user.user_id, &EntryQuery::all()).await?;
    let entries = filter_entries(&all, &filter, state.config.local_offset);
    let doc = export_entries(&entries, query.format, state.config.local_offset, state.config.today())?;

    Ok((
        [
            (header::CONTENT_TYPE, doc.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", doc.filename),
            ),
        ],
        doc.body,
    ))
}

#[derive(Serialize)]
pub struct EntryPage {
    pub entry: Entry,
    /// `None` also when the linked prompt no longer exists.
    pub prompt: Option<Prompt>,
}

async fn load_entry_page(state: &AppState, user_id: Uuid, entry_id: Uuid) -> Result<EntryPage, ActionError> {
    let entry = state
        .db
        .get_entry_by_id(user_id, entry_id)
        .await?
        .ok_or(ActionError::NotFound)?;

    let prompt = match entry.prompt_id {
        Some(prompt_id) => prompt_by_id(&*state.db, user_id, prompt_id).await?,
        None => None,
    };

    Ok(EntryPage { entry, prompt })
}

/// GET /archive/{id}
pub async fn archive_entry_page(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    PathParam(entry_id): PathParam<Uuid>,
) -> Result<Json<EntryPage>, ActionError> {
    Ok(Json(load_entry_page(&state, user.user_id, entry_id).await?))
}

/// GET /archive/{id}/edit
pub async fn archive_edit_page(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    PathParam(entry_id): PathParam<Uuid>,
) -> Result<Json<EntryPage>, ActionError> {
    Ok(Json(load_entry_page(&state, user.user_id, entry_id).await?))
}

//=========================================================================================
// Patterns
//=========================================================================================

#[derive(Serialize)]
pub struct AnalysisOption {
    pub kind: AnalysisKind,
    pub title: &'static str,
}

#[derive(Serialize)]
pub struct PatternsPage {
    pub analyses: Vec<AnalysisOption>,
}

/// GET /patterns
pub async fn patterns_page() -> Json<PatternsPage> {
    Json(PatternsPage {
        analyses: AnalysisKind::ALL
            .iter()
            .map(|&kind| AnalysisOption {
                kind,
                title: kind.title(),
            })
            .collect(),
    })
}
