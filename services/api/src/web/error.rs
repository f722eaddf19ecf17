//! services/api/src/web/error.rs
//!
//! The error every server action can return. It always renders as
//! `{ "error": string }`; external failures never leak their detail.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use journal_core::archive::ExportError;
use journal_core::coach::CoachError;
use journal_core::ports::PortError;
use journal_core::validation::ValidationError;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

/// Shown for any datastore or text-generation failure.
pub const RETRY_MESSAGE: &str = "Something went wrong. Please try again.";
pub const NOT_AUTHENTICATED: &str = "Not authenticated";

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// Bad input, caught before any external call.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Auth(String),
    #[error("Not found")]
    NotFound,
    /// Carries the internal detail for the log only.
    #[error("External call failed: {0}")]
    External(String),
}

/// Body of every failed action.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl ActionError {
    fn status(&self) -> StatusCode {
        match self {
            ActionError::Validation(_) => StatusCode::BAD_REQUEST,
            ActionError::Auth(_) => StatusCode::UNAUTHORIZED,
            ActionError::NotFound => StatusCode::NOT_FOUND,
            ActionError::External(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            ActionError::External(_) => RETRY_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        if let ActionError::External(detail) = &self {
            error!("Action failed: {}", detail);
        }
        let body = ErrorBody {
            error: self.public_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<ValidationError> for ActionError {
    fn from(e: ValidationError) -> Self {
        ActionError::Validation(e.to_string())
    }
}

impl From<PortError> for ActionError {
    fn from(e: PortError) -> Self {
        match e {
            PortError::NotFound(_) => ActionError::NotFound,
            PortError::Unauthorized => ActionError::Auth(NOT_AUTHENTICATED.to_string()),
            PortError::Conflict(detail) | PortError::Unexpected(detail) => ActionError::External(detail),
        }
    }
}

impl From<CoachError> for ActionError {
    fn from(e: CoachError) -> Self {
        match e {
            CoachError::Validation(v) => v.into(),
            CoachError::Port(p) => p.into(),
        }
    }
}

impl From<ExportError> for ActionError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::Empty => ActionError::Validation(ExportError::Empty.to_string()),
            ExportError::Serialize(inner) => ActionError::External(inner.to_string()),
        }
    }
}
