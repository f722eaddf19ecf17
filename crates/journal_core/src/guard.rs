//! crates/journal_core/src/guard.rs
//!
//! The per-request session guard as a decision table. The web layer resolves
//! the caller's identity, classifies the path, and acts on the decision.

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// Paths only meaningful to someone who is signed out.
const AUTH_ONLY_PATHS: [&str; 2] = ["/login", "/signup"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// Sign-in and sign-up pages.
    AuthOnly,
    Protected,
}

impl RouteAccess {
    pub fn classify(path: &str) -> Self {
        if AUTH_ONLY_PATHS.contains(&path) {
            RouteAccess::AuthOnly
        } else {
            RouteAccess::Protected
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    PassThrough,
    Redirect(&'static str),
}

pub fn guard_decision(authenticated: bool, access: RouteAccess) -> GuardDecision {
    match (authenticated, access) {
        (false, RouteAccess::Protected) => GuardDecision::Redirect(LOGIN_PATH),
        (true, RouteAccess::AuthOnly) => GuardDecision::Redirect(HOME_PATH),
        _ => GuardDecision::PassThrough,
    }
}
