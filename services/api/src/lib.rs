//! services/api/src/lib.rs
//!
//! The journal web service: adapters for the core ports, configuration and
//! the HTTP layer.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
