pub mod auth;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod pages;
pub mod rest;
pub mod routes;
pub mod state;

// Re-export the router builder for the binary and the integration tests.
pub use routes::build_router;
