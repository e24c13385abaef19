pub mod auth;
pub mod metrics;

pub use auth::{auth_middleware, AuthSession, SessionContext};
pub use metrics::metrics_middleware;
