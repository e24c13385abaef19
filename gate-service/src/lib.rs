pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use gate_core::axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Json, Router,
};
use gate_core::middleware::{
    rate_limit::{ip_rate_limit_middleware, IpRateLimiter},
    security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::SecurityScheme,
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::GateConfig;
use crate::middleware::metrics_middleware;
use crate::services::{
    CredentialStore, GateRegistry, MemberDirectory, PreferencesService, SessionService,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::session_status,
        handlers::gate::request_challenge,
        handlers::gate::submit_pin,
        handlers::gate::confirm_action,
        handlers::gate::cancel_challenge,
        handlers::credentials::update_pin,
        handlers::credentials::update_password,
        handlers::members::list_members,
        handlers::members::get_member,
        handlers::security::get_preferences,
        handlers::security::update_preferences,
    ),
    components(
        schemas(
            dtos::ErrorResponse,
            dtos::MessageResponse,
            dtos::auth::LoginRequest,
            dtos::auth::LoginResponse,
            dtos::auth::SessionStatusResponse,
            dtos::gate::GateRequestBody,
            dtos::gate::ChallengeResponse,
            dtos::gate::SubmitPinRequest,
            dtos::gate::GateOutcomeResponse,
            dtos::credentials::UpdatePinRequest,
            dtos::credentials::UpdatePasswordRequest,
            dtos::members::MemberListResponse,
            dtos::security::UpdatePreferencesRequest,
            models::Congregation,
            models::Member,
            models::MemberUpdate,
            models::Gender,
            models::PendingAction,
            models::ActionKind,
            models::ChallengePrompt,
            models::SecurityPreferences,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Congregation login and session lifecycle"),
        (name = "Gate", description = "PIN-gated action authorization workflow"),
        (name = "Credentials", description = "PIN and password rotation"),
        (name = "Members", description = "Member directory reads"),
        (name = "Security", description = "Security preference management"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .build(),
                ),
            );
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: GateConfig,
    pub credentials: Arc<CredentialStore>,
    pub sessions: Arc<SessionService>,
    pub gates: Arc<GateRegistry>,
    pub members: Arc<MemberDirectory>,
    pub preferences: PreferencesService,
    pub login_rate_limiter: IpRateLimiter,
    pub pin_rate_limiter: IpRateLimiter,
    pub ip_rate_limiter: IpRateLimiter,
}

pub fn build_router(state: AppState) -> Router {
    // Login is rate limited separately from everything else
    let login_limiter = state.login_rate_limiter.clone();
    let login_route = Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .layer(from_fn_with_state(login_limiter, ip_rate_limit_middleware));

    // PIN submission gets its own, tighter limiter
    let pin_limiter = state.pin_rate_limiter.clone();
    let submit_route = Router::new()
        .route("/gate/submit", post(handlers::gate::submit_pin))
        .route("/credentials/pin", post(handlers::credentials::update_pin))
        .layer(from_fn_with_state(pin_limiter, ip_rate_limit_middleware))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let authed_routes = Router::new()
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/session", get(handlers::auth::session_status))
        .route("/gate/request", post(handlers::gate::request_challenge))
        .route("/gate/confirm", post(handlers::gate::confirm_action))
        .route("/gate/cancel", post(handlers::gate::cancel_challenge))
        .route(
            "/credentials/password",
            post(handlers::credentials::update_password),
        )
        .route("/members", get(handlers::members::list_members))
        .route("/members/:member_id", get(handlers::members::get_member))
        .route(
            "/security/preferences",
            get(handlers::security::get_preferences),
        )
        .route(
            "/security/preferences",
            put(handlers::security::update_preferences),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let ip_limiter = state.ip_rate_limiter.clone();

    let mut app = Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(handlers::metrics::metrics));

    // Swagger UI stays on in dev, off in prod
    if state.config.environment == gate_core::config::Environment::Dev {
        app = app
            .merge(SwaggerUi::new("/docs").url("/.well-known/openapi.json", ApiDoc::openapi()));
    } else {
        app = app.route(
            "/.well-known/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        );
    }

    let cors = build_cors(&state.config.security.allowed_origins);

    app.merge(login_route)
        .merge(submit_route)
        .merge(authed_routes)
        .with_state(state)
        // Global IP rate limiting
        .layer(from_fn_with_state(ip_limiter, ip_rate_limit_middleware))
        // Request metrics
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &gate_core::axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            },
        ))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors)
}

fn build_cors(allowed_origins: &[String]) -> CorsLayer {
    use gate_core::axum::http::{header, HeaderValue, Method};

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Service health probe.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    ),
    tag = "Observability"
)]
pub async fn health_check() -> &'static str {
    "OK"
}
