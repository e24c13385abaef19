//! HTTP handlers for gate-service.

pub mod auth;
pub mod credentials;
pub mod gate;
pub mod members;
pub mod metrics;
pub mod security;
