//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the server actions the pages call, and the
//! master definition for the OpenAPI specification.

use crate::web::auth::{AuthPage, AuthResponse, CredentialsRequest, RedirectIntent};
use crate::web::error::{ActionError, ErrorBody};
use crate::web::extract::{JsonBody, PathParam, QueryParams};
use crate::web::state::{AppState, CurrentUser};
use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use journal_core::analysis::{run_pattern_analysis, AnalysisKind, AnalysisReport};
use journal_core::archive::ArchiveFilter;
use journal_core::coach::{clear_transcript, load_transcript, send_coach_message, CoachContext, CoachExchange};
use journal_core::domain::{CoachMessage, Entry, NewEntry, Prompt, WritingKind};
use journal_core::period::period_key;
use journal_core::prompts::{obtain_period_prompt, prompt_by_id};
use journal_core::validation::validate_entry_text;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

const ARCHIVE_PATH: &str = "/archive";

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::signup_handler,
        crate::web::auth::login_handler,
        crate::web::auth::logout_handler,
        save_entry_handler,
        update_entry_handler,
        delete_entry_handler,
        list_entries_handler,
        get_entry_handler,
        daily_prompt_handler,
        weekly_prompt_handler,
        get_prompt_handler,
        coach_message_handler,
        coach_transcript_handler,
        coach_clear_handler,
        run_analysis_handler,
    ),
    components(
        schemas(
            CredentialsRequest, AuthResponse, AuthPage, RedirectIntent, ErrorBody,
            SaveEntryRequest, UpdateEntryRequest, DeleteEntryResponse, CoachRequest,
            RunAnalysisRequest
        )
    ),
    tags(
        (name = "Writing Journal API", description = "Prompts, entries, coach and pattern analysis for the writing journal.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SaveEntryRequest {
    pub entry_text: String,
    #[schema(value_type = String, example = "daily")]
    pub entry_type: WritingKind,
    pub prompt_id: Option<Uuid>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateEntryRequest {
    pub entry_text: String,
}

/// The stored entry plus where the client goes next.
#[derive(Serialize)]
pub struct SavedEntryResponse {
    #[serde(flatten)]
    pub entry: Entry,
    pub redirect_to: String,
}

#[derive(Serialize, ToSchema)]
pub struct DeleteEntryResponse {
    pub success: bool,
    pub redirect_to: String,
}

/// `prompt` is null when one could not be produced right now.
#[derive(Serialize)]
pub struct PromptResponse {
    pub prompt: Option<Prompt>,
}

#[derive(Deserialize, ToSchema)]
pub struct CoachRequest {
    pub session_key: String,
    pub message: String,
    #[schema(value_type = Object)]
    pub context: CoachContext,
}

#[derive(Deserialize, ToSchema)]
pub struct RunAnalysisRequest {
    #[schema(value_type = String, example = "themes")]
    pub kind: AnalysisKind,
}

#[derive(Serialize)]
pub struct TranscriptResponse {
    pub session_key: String,
    pub messages: Vec<CoachMessage>,
}

//=========================================================================================
// Entry Actions
//=========================================================================================

/// Save a new entry.
#[utoipa::path(
    post,
    path = "/entries",
    request_body = SaveEntryRequest,
    responses(
        (status = 201, description = "Entry saved"),
        (status = 400, description = "Empty entry text or malformed body", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn save_entry_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    JsonBody(req): JsonBody<SaveEntryRequest>,
) -> Result<impl IntoResponse, ActionError> {
    validate_entry_text(&req.entry_text)?;

    let entry = state
        .db
        .create_entry(NewEntry {
            user_id: user.user_id,
            prompt_id: req.prompt_id,
            entry_text: req.entry_text,
            entry_type: req.entry_type,
        })
        .await?;
    info!("Saved {} entry {}", entry.entry_type, entry.id);

    Ok((
        StatusCode::CREATED,
        Json(SavedEntryResponse {
            entry,
            redirect_to: ARCHIVE_PATH.to_string(),
        }),
    ))
}

/// Replace the text of an entry the caller owns.
#[utoipa::path(
    put,
    path = "/entries/{id}",
    request_body = UpdateEntryRequest,
    params(("id" = Uuid, Path, description = "Entry id")),
    responses(
        (status = 200, description = "Entry updated"),
        (status = 400, description = "Empty entry text or malformed body", body = ErrorBody),
        (status = 404, description = "No such entry for this user", body = ErrorBody)
    )
)]
pub async fn update_entry_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    PathParam(entry_id): PathParam<Uuid>,
    JsonBody(req): JsonBody<UpdateEntryRequest>,
) -> Result<Json<Entry>, ActionError> {
    validate_entry_text(&req.entry_text)?;

    state
        .db
        .update_entry_text(user.user_id, entry_id, &req.entry_text)
        .await?
        .map(Json)
        .ok_or(ActionError::NotFound)
}

/// Delete an entry the caller owns.
#[utoipa::path(
    delete,
    path = "/entries/{id}",
    params(("id" = Uuid, Path, description = "Entry id")),
    responses(
        (status = 200, description = "Entry deleted", body = DeleteEntryResponse),
        (status = 404, description = "No such entry for this user", body = ErrorBody)
    )
)]
pub async fn delete_entry_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    PathParam(entry_id): PathParam<Uuid>,
) -> Result<Json<DeleteEntryResponse>, ActionError> {
    if !state.db.delete_entry(user.user_id, entry_id).await? {
        return Err(ActionError::NotFound);
    }
    info!("Deleted entry {}", entry_id);

    Ok(Json(DeleteEntryResponse {
        success: true,
        redirect_to: ARCHIVE_PATH.to_string(),
    }))
}

/// List the caller's entries, newest first, optionally filtered.
#[utoipa::path(
    get,
    path = "/entries",
    params(
        ("type" = Option<String>, Query, description = "all, daily or fiction"),
        ("from" = Option<String>, Query, description = "Inclusive start date, YYYY-MM-DD"),
        ("to" = Option<String>, Query, description = "Inclusive end date, YYYY-MM-DD")
    ),
    responses((status = 200, description = "Matching entries"))
)]
pub async fn list_entries_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    QueryParams(filter): QueryParams<ArchiveFilter>,
) -> Result<Json<Vec<Entry>>, ActionError> {
    let query = filter.to_query(state.config.local_offset);
    Ok(Json(state.db.list_entries(user.user_id, &query).await?))
}

#[utoipa::path(
    get,
    path = "/entries/{id}",
    params(("id" = Uuid, Path, description = "Entry id")),
    responses(
        (status = 200, description = "The entry"),
        (status = 404, description = "No such entry for this user", body = ErrorBody)
    )
)]
pub async fn get_entry_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    PathParam(entry_id): PathParam<Uuid>,
) -> Result<Json<Entry>, ActionError> {
    state
        .db
        .get_entry_by_id(user.user_id, entry_id)
        .await?
        .map(Json)
        .ok_or(ActionError::NotFound)
}

//=========================================================================================
// Prompt Actions
//=========================================================================================

async fn current_prompt(state: &AppState, user_id: Uuid, kind: WritingKind) -> PromptResponse {
    let key = period_key(kind, state.config.today());
    let prompt = obtain_period_prompt(&*state.db, &*state.prompt_adapter, user_id, kind, key).await;
    PromptResponse { prompt }
}

/// Today's daily prompt, generated on first request.
#[utoipa::path(
    get,
    path = "/prompts/daily",
    responses((status = 200, description = "The prompt, or null when unavailable"))
)]
pub async fn daily_prompt_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Json<PromptResponse> {
    Json(current_prompt(&state, user.user_id, WritingKind::Daily).await)
}

/// This week's fiction prompt, generated on first request.
#[utoipa::path(
    get,
    path = "/prompts/weekly",
    responses((status = 200, description = "The prompt, or null when unavailable"))
)]
pub async fn weekly_prompt_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Json<PromptResponse> {
    Json(current_prompt(&state, user.user_id, WritingKind::Fiction).await)
}

#[utoipa::path(
    get,
    path = "/prompts/{id}",
    params(("id" = Uuid, Path, description = "Prompt id")),
    responses(
        (status = 200, description = "The prompt"),
        (status = 404, description = "No such prompt for this user", body = ErrorBody)
    )
)]
pub async fn get_prompt_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    PathParam(prompt_id): PathParam<Uuid>,
) -> Result<Json<Prompt>, ActionError> {
    prompt_by_id(&*state.db, user.user_id, prompt_id)
        .await?
        .map(Json)
        .ok_or(ActionError::NotFound)
}

//=========================================================================================
// Coach Actions
//=========================================================================================

/// Send one message to the writing coach.
#[utoipa::path(
    post,
    path = "/coach",
    request_body = CoachRequest,
    responses(
        (status = 200, description = "The coach's reply and the updated transcript"),
        (status = 400, description = "Empty message", body = ErrorBody),
        (status = 500, description = "Coach unavailable", body = ErrorBody)
    )
)]
pub async fn coach_message_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    JsonBody(req): JsonBody<CoachRequest>,
) -> Result<Json<CoachExchange>, ActionError> {
    let exchange = send_coach_message(
        &*state.transcripts,
        &*state.coach_adapter,
        user.user_id,
        &req.session_key,
        &req.message,
        &req.context,
    )
    .await?;
    Ok(Json(exchange))
}

#[utoipa::path(
    get,
    path = "/coach/{session_key}",
    params(("session_key" = String, Path, description = "Writing session key")),
    responses((status = 200, description = "The stored transcript"))
)]
pub async fn coach_transcript_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    PathParam(session_key): PathParam<String>,
) -> Result<Json<TranscriptResponse>, ActionError> {
    let messages = load_transcript(&*state.transcripts, user.user_id, &session_key).await?;
    Ok(Json(TranscriptResponse { session_key, messages }))
}

#[utoipa::path(
    delete,
    path = "/coach/{session_key}",
    params(("session_key" = String, Path, description = "Writing session key")),
    responses((status = 204, description = "Transcript cleared"))
)]
pub async fn coach_clear_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    PathParam(session_key): PathParam<String>,
) -> Result<StatusCode, ActionError> {
    clear_transcript(&*state.transcripts, user.user_id, &session_key).await?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Pattern Analysis
//=========================================================================================

/// Analyse every entry the caller has written.
#[utoipa::path(
    post,
    path = "/patterns",
    request_body = RunAnalysisRequest,
    responses(
        (status = 200, description = "Title and analysis text"),
        (status = 500, description = "Analysis failed", body = ErrorBody)
    )
)]
pub async fn run_analysis_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    JsonBody(req): JsonBody<RunAnalysisRequest>,
) -> Result<Json<AnalysisReport>, ActionError> {
    let report = run_pattern_analysis(
        &*state.db,
        &*state.analysis_adapter,
        user.user_id,
        req.kind,
        state.config.local_offset,
    )
    .await?;
    Ok(Json(report))
}
