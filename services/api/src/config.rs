//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use chrono::{FixedOffset, NaiveDate};
use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub prompt_model: String,
    pub coach_model: String,
    pub analysis_model: String,
    /// The writer's timezone; decides where one day ends and the next begins.
    pub local_offset: FixedOffset,
    pub allowed_origin: String,
    pub cookie_secure: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Text-Generation Settings ---
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        let openai_base_url = std::env::var("OPENAI_BASE_URL").ok();
        let prompt_model = std::env::var("PROMPT_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
        let coach_model = std::env::var("COACH_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
        let analysis_model =
            std::env::var("ANALYSIS_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());

        // --- Load Web Settings ---
        let offset_str = std::env::var("LOCAL_UTC_OFFSET").unwrap_or_else(|_| "+00:00".to_string());
        let local_offset = offset_str.parse::<FixedOffset>().map_err(|_| {
            ConfigError::InvalidValue(
                "LOCAL_UTC_OFFSET".to_string(),
                format!("'{}' is not an offset like +02:00", offset_str),
            )
        })?;

        let allowed_origin = std::env::var("ALLOWED_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let cookie_secure = match std::env::var("COOKIE_SECURE") {
            Ok(v) => v.parse::<bool>().map_err(|_| {
                ConfigError::InvalidValue("COOKIE_SECURE".to_string(), format!("'{}' is not a bool", v))
            })?,
            Err(_) => true,
        };

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            openai_api_key,
            openai_base_url,
            prompt_model,
            coach_model,
            analysis_model,
            local_offset,
            allowed_origin,
            cookie_secure,
        })
    }

    /// Today's date at the configured offset.
    pub fn today(&self) -> NaiveDate {
        journal_core::period::local_today(self.local_offset)
    }
}
