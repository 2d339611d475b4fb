//! # Identity Infrastructure
//!
//! Database implementations (adapters) for the session store.

pub mod database;

pub use database::{create_pool, run_migrations, PgSessionRepository};
