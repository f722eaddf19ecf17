//! crates/journal_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database driver; they only carry
//! `serde` derives so the web layer can hand them straight to the client.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The two kinds of writing the journal deals in. Prompts and entries share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WritingKind {
    Daily,
    Fiction,
}

impl WritingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WritingKind::Daily => "daily",
            WritingKind::Fiction => "fiction",
        }
    }

    /// Capitalised form used in exported documents.
    pub fn label(&self) -> &'static str {
        match self {
            WritingKind::Daily => "Daily",
            WritingKind::Fiction => "Fiction",
        }
    }
}

impl fmt::Display for WritingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown writing kind '{0}'")]
pub struct UnknownKind(pub String);

impl FromStr for WritingKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(WritingKind::Daily),
            "fiction" => Ok(WritingKind::Fiction),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

// Represents a user - used throughout app
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

/// A generated writing prompt, unique per (user, kind, period).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: Uuid,
    pub user_id: Uuid,
    pub prompt_text: String,
    pub prompt_type: WritingKind,
    pub generated_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// The fields needed to persist a freshly generated prompt.
#[derive(Debug, Clone)]
pub struct NewPrompt {
    pub user_id: Uuid,
    pub prompt_text: String,
    pub prompt_type: WritingKind,
    pub generated_date: NaiveDate,
}

/// A piece of writing authored by a user.
///
/// `prompt_id` is a weak reference: the prompt may no longer exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub prompt_id: Option<Uuid>,
    pub entry_text: String,
    pub entry_type: WritingKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEntry {
    pub user_id: Uuid,
    pub prompt_id: Option<Uuid>,
    pub entry_text: String,
    pub entry_type: WritingKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoachRole {
    User,
    Assistant,
}

/// A single turn in a coach conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachMessage {
    pub role: CoachRole,
    pub content: String,
}

impl CoachMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: CoachRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: CoachRole::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_only_known_values() {
        assert_eq!("daily".parse::<WritingKind>(), Ok(WritingKind::Daily));
        assert_eq!("fiction".parse::<WritingKind>(), Ok(WritingKind::Fiction));
        assert!("Daily".parse::<WritingKind>().is_err());
        assert!("poem".parse::<WritingKind>().is_err());
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&WritingKind::Fiction).unwrap();
        assert_eq!(json, "\"fiction\"");
    }
}
