//! # Identity Core
//!
//! Domain entities, the gateway service, and repository traits for the
//! cross-domain session propagation flow.

pub mod domain;
pub mod error;
pub mod repositories;
pub mod services;

pub use domain::*;
pub use error::DomainError;
