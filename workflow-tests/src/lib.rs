//! End-to-end workflow tests for the gate service.
//!
//! The whole service runs in-process: tests build the real router with
//! seeded state and drive it through `tower::ServiceExt::oneshot`, so no
//! running server or external backend is needed.

use std::sync::Arc;
use std::time::Duration;

use gate_core::axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use gate_core::config::Environment;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use gate_service::config::{
    GateConfig, GateTimingConfig, PinConfig, RateLimitConfig, SecurityConfig, SessionConfig,
};
use gate_service::models::{Congregation, Member};
use gate_service::services::notify::CollectingSink;
use gate_service::services::{
    seed, CredentialStore, GateRegistry, InMemoryStore, MemberDirectory, PinPolicy,
    PreferencesService, SessionService,
};
use gate_service::{build_router, AppState};

pub struct TestApp {
    pub router: Router,
    pub congregations: Vec<Congregation>,
    pub members: Arc<MemberDirectory>,
    pub notifications: Arc<CollectingSink>,
}

fn test_config() -> GateConfig {
    GateConfig {
        common: gate_core::config::Config { port: 0 },
        environment: Environment::Dev,
        service_name: "gate-service".to_string(),
        service_version: "test".to_string(),
        log_level: "warn".to_string(),
        session: SessionConfig { ttl_hours: 24 },
        pin: PinConfig {
            min_len: 4,
            max_len: 4,
        },
        gate: GateTimingConfig {
            call_timeout_seconds: 10,
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        rate_limit: RateLimitConfig {
            login_attempts: 3,
            login_window_seconds: 60,
            pin_attempts: 100,
            pin_window_seconds: 60,
            global_ip_limit: 10_000,
            global_ip_window_seconds: 60,
        },
    }
}

/// Build the full application with seed data and a collecting
/// notification sink.
pub fn spawn_app() -> TestApp {
    let config = test_config();
    let policy = PinPolicy {
        min_len: config.pin.min_len,
        max_len: config.pin.max_len,
    };

    let credentials = Arc::new(
        CredentialStore::seed(policy, seed::seed_credentials())
            .expect("seeding credential store"),
    );
    let congregations = credentials.congregations();
    let members = Arc::new(MemberDirectory::seed(seed::seed_members(&congregations)));
    let notifications = Arc::new(CollectingSink::new());

    let gates = Arc::new(GateRegistry::new(
        credentials.clone(),
        members.clone(),
        notifications.clone(),
        policy,
        Duration::from_secs(config.gate.call_timeout_seconds),
    ));

    let state = AppState {
        credentials,
        sessions: Arc::new(SessionService::new(config.session.ttl_hours)),
        gates,
        members: members.clone(),
        preferences: PreferencesService::new(Arc::new(InMemoryStore::new())),
        login_rate_limiter: gate_core::middleware::rate_limit::create_ip_rate_limiter(
            config.rate_limit.login_attempts,
            config.rate_limit.login_window_seconds,
        ),
        pin_rate_limiter: gate_core::middleware::rate_limit::create_ip_rate_limiter(
            config.rate_limit.pin_attempts,
            config.rate_limit.pin_window_seconds,
        ),
        ip_rate_limiter: gate_core::middleware::rate_limit::create_ip_rate_limiter(
            config.rate_limit.global_ip_limit,
            config.rate_limit.global_ip_window_seconds,
        ),
        config,
    };

    TestApp {
        router: build_router(state),
        congregations,
        members,
        notifications,
    }
}

impl TestApp {
    /// Fire one request at the in-process app and decode the JSON body
    /// (an empty body decodes as `null`).
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("building request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("reading body")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        };

        (status, value)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, path, token, None).await
    }

    pub async fn post(
        &self,
        path: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        self.request(Method::POST, path, token, Some(body)).await
    }

    /// Log in and return the bearer token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .post(
                "/auth/login",
                None,
                json!({"username": username, "password": password}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["token"].as_str().expect("token in response").to_string()
    }

    /// First member visible to the given congregation username's account.
    pub fn any_member_of(&self, congregation_username: &str) -> Member {
        let congregation = self
            .congregations
            .iter()
            .find(|c| c.username == congregation_username)
            .expect("known congregation");
        self.members
            .list_for(&gate_service::models::Principal::from_congregation(
                congregation,
            ))
            .into_iter()
            .next()
            .expect("congregation has seed members")
    }
}
