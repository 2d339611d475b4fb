//! # Identity API
//!
//! HTTP handlers, router, and response helpers for the identity gateway.

pub mod handlers;
pub mod response;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
