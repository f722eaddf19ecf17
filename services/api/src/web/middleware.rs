//! services/api/src/web/middleware.rs
//!
//! The session guard, run once per incoming request.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use journal_core::guard::{guard_decision, GuardDecision, RouteAccess};
use journal_core::ports::PortError;
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

use crate::web::state::{AppState, CurrentUser};

pub const SESSION_COOKIE: &str = "session";

/// Pulls the auth session token out of the `Cookie` header.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| {
            let (name, value) = c.trim().split_once('=')?;
            (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
        })
}

/// Validates the cookie against the auth-session table. Any failure counts as anonymous.
async fn resolve_identity(state: &AppState, token: &str) -> Option<Uuid> {
    match state.db.validate_auth_session(token).await {
        Ok(user_id) => Some(user_id),
        Err(PortError::Unauthorized) => None,
        Err(e) => {
            error!("Failed to validate auth session: {:?}", e);
            None
        }
    }
}

/// Redirects anonymous visitors away from protected routes and signed-in
/// users away from the login and signup pages. On pass-through the resolved
/// identity is inserted into request extensions as a `CurrentUser`.
pub async fn session_guard(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let current = match session_token(req.headers()) {
        Some(token) => resolve_identity(&state, &token)
            .await
            .map(|user_id| CurrentUser {
                user_id,
                session_id: token,
            }),
        None => None,
    };

    let access = RouteAccess::classify(req.uri().path());
    match guard_decision(current.is_some(), access) {
        GuardDecision::Redirect(to) => {
            debug!("Guard redirecting {} to {}", req.uri().path(), to);
            Redirect::to(to).into_response()
        }
        GuardDecision::PassThrough => {
            if let Some(user) = current {
                req.extensions_mut().insert(user);
            }
            next.run(req).await
        }
    }
}
