//! Domain services

pub mod gateway_service;

pub use gateway_service::{GatewayService, LoginOutcome};
