//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use journal_core::ports::{
    CoachService, DatabaseService, PatternAnalysisService, PromptGenerationService, TranscriptStore,
};
use std::sync::Arc;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub prompt_adapter: Arc<dyn PromptGenerationService>,
    pub coach_adapter: Arc<dyn CoachService>,
    pub analysis_adapter: Arc<dyn PatternAnalysisService>,
    pub transcripts: Arc<dyn TranscriptStore>,
}

//=========================================================================================
// CurrentUser (Specific to One Request)
//=========================================================================================

/// The identity the session guard resolved for this request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: Uuid,
    /// The auth session token the request carried.
    pub session_id: String,
}
