//! services/api/src/web/auth.rs
//!
//! Authentication pages and actions: sign up, sign in, sign out.
//! Every action answers with an explicit redirect intent for the client.

use axum::{
    extract::{Extension, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use journal_core::guard::{HOME_PATH, LOGIN_PATH};
use journal_core::ports::PortError;
use journal_core::validation::{validate_credentials, validate_signup, MIN_PASSWORD_LEN};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;
use utoipa::ToSchema;

use crate::config::Config;
use crate::web::error::{ActionError, ErrorBody};
use crate::web::extract::JsonBody;
use crate::web::middleware::SESSION_COOKIE;
use crate::web::state::{AppState, CurrentUser};

const SESSION_DAYS: i64 = 30;
const INVALID_CREDENTIALS: &str = "Invalid login credentials";
const ALREADY_REGISTERED: &str = "User already registered";

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub email: String,
    pub redirect_to: String,
}

/// Where the client should navigate next.
#[derive(Serialize, ToSchema)]
pub struct RedirectIntent {
    pub redirect_to: String,
}

/// What the login and signup pages render.
#[derive(Serialize, ToSchema)]
pub struct AuthPage {
    pub page: String,
    pub action: String,
    pub min_password_length: usize,
}

//=========================================================================================
// Helpers
//=========================================================================================

fn session_cookie(config: &Config, session_id: &str, max_age: i64) -> String {
    let secure = if config.cookie_secure { " Secure;" } else { "" };
    format!(
        "{}={}; HttpOnly;{} SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, session_id, secure, max_age
    )
}

/// Opens a 30 day auth session and returns its cookie.
async fn open_session(state: &AppState, user_id: Uuid) -> Result<String, ActionError> {
    let auth_session_id = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::days(SESSION_DAYS);

    state
        .db
        .create_auth_session(&auth_session_id, user_id, expires_at)
        .await?;

    Ok(session_cookie(
        &state.config,
        &auth_session_id,
        Duration::days(SESSION_DAYS).num_seconds(),
    ))
}

fn hash_password(password: &str) -> Result<String, ActionError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ActionError::External(format!("Failed to hash password: {:?}", e)))
}

//=========================================================================================
// Pages
//=========================================================================================

/// GET /login
pub async fn login_page() -> Json<AuthPage> {
    Json(AuthPage {
        page: "login".to_string(),
        action: LOGIN_PATH.to_string(),
        min_password_length: MIN_PASSWORD_LEN,
    })
}

/// GET /signup
pub async fn signup_page() -> Json<AuthPage> {
    Json(AuthPage {
        page: "signup".to_string(),
        action: "/signup".to_string(),
        min_password_length: MIN_PASSWORD_LEN,
    })
}

//=========================================================================================
// Actions
//=========================================================================================

/// POST /signup - Create a new user account
#[utoipa::path(
    post,
    path = "/signup",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "User created and signed in", body = AuthResponse),
        (status = 400, description = "Missing email or short password", body = ErrorBody),
        (status = 401, description = "Email already registered", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<CredentialsRequest>,
) -> Result<impl IntoResponse, ActionError> {
    // 1. Validate before touching the datastore
    validate_signup(&req.email, &req.password)?;
    let email = req.email.trim();

    // 2. Hash the password and create the user
    let password_hash = hash_password(&req.password)?;
    let user = state
        .db
        .create_user_with_email(email, &password_hash)
        .await
        .map_err(|e| match e {
            PortError::Conflict(_) => ActionError::Auth(ALREADY_REGISTERED.to_string()),
            other => other.into(),
        })?;

    // 3. Sign the new user in
    let cookie = open_session(&state, user.id).await?;
    info!("User {} signed up", user.id);

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            user_id: user.id,
            email: user.email,
            redirect_to: HOME_PATH.to_string(),
        }),
    ))
}

/// POST /login - Login with existing account
#[utoipa::path(
    post,
    path = "/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Missing email or password", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<CredentialsRequest>,
) -> Result<impl IntoResponse, ActionError> {
    validate_credentials(&req.email, &req.password)?;

    // 1. Get user by email
    let user_creds = state
        .db
        .get_user_by_email(req.email.trim())
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => ActionError::Auth(INVALID_CREDENTIALS.to_string()),
            other => other.into(),
        })?;

    // 2. Verify password
    let parsed_hash = PasswordHash::new(&user_creds.hashed_password).map_err(|e| {
        ActionError::External(format!("Failed to parse password hash: {:?}", e))
    })?;

    let valid = Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_ok();

    if !valid {
        return Err(ActionError::Auth(INVALID_CREDENTIALS.to_string()));
    }

    // 3. Open the auth session
    let cookie = open_session(&state, user_creds.user_id).await?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            user_id: user_creds.user_id,
            email: user_creds.email,
            redirect_to: HOME_PATH.to_string(),
        }),
    ))
}

/// POST /logout - Logout and invalidate session
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Logout successful", body = RedirectIntent),
        (status = 303, description = "No active session; redirected to /login")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ActionError> {
    if let Err(e) = state.db.delete_auth_session(&user.session_id).await {
        error!("Failed to delete auth session: {:?}", e);
        return Err(e.into());
    }

    let cookie = session_cookie(&state.config, "", 0);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(RedirectIntent {
            redirect_to: LOGIN_PATH.to_string(),
        }),
    ))
}

