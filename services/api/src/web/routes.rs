//! services/api/src/web/routes.rs
//!
//! Assembles the application router. Every page and action sits behind the
//! session guard; only the API docs are served outside it.

use crate::error::ApiError;
use crate::web::{auth, middleware::session_guard, pages, rest, rest::ApiDoc, state::AppState};
use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn build_router(state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = state
        .config
        .allowed_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid ALLOWED_ORIGIN: {}", e)))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- Pages ---
    let page_routes = Router::new()
        .route("/", get(pages::home_page))
        .route("/write", get(pages::write_page))
        .route("/archive", get(pages::archive_page))
        .route("/archive/export", get(pages::archive_export))
        .route("/archive/{id}", get(pages::archive_entry_page))
        .route("/archive/{id}/edit", get(pages::archive_edit_page))
        .route("/patterns", get(pages::patterns_page).post(rest::run_analysis_handler));

    // --- Auth ---
    let auth_routes = Router::new()
        .route("/login", get(auth::login_page).post(auth::login_handler))
        .route("/signup", get(auth::signup_page).post(auth::signup_handler))
        .route("/logout", post(auth::logout_handler));

    // --- Actions ---
    let action_routes = Router::new()
        .route(
            "/entries",
            get(rest::list_entries_handler).post(rest::save_entry_handler),
        )
        .route(
            "/entries/{id}",
            get(rest::get_entry_handler)
                .put(rest::update_entry_handler)
                .delete(rest::delete_entry_handler),
        )
        .route("/prompts/daily", get(rest::daily_prompt_handler))
        .route("/prompts/weekly", get(rest::weekly_prompt_handler))
        .route("/prompts/{id}", get(rest::get_prompt_handler))
        .route("/coach", post(rest::coach_message_handler))
        .route(
            "/coach/{session_key}",
            get(rest::coach_transcript_handler).delete(rest::coach_clear_handler),
        );

    let guarded = Router::new()
        .merge(page_routes)
        .merge(auth_routes)
        .merge(action_routes)
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), session_guard))
        .with_state(state);

    Ok(Router::new()
        .merge(guarded)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}
