//! # Identity Security
//!
//! Identity-token (JWT) validation and auth-cookie handling.

pub mod cookie;
pub mod token;

pub use token::IdentityTokenService;
