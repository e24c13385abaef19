use gate_service::{
    build_router,
    config::GateConfig,
    services::{
        seed, CredentialStore, GateRegistry, InMemoryStore, MemberDirectory, PinPolicy,
        PreferencesService, SessionService, TracingSink,
    },
    AppState,
};
use gate_core::middleware::rate_limit::create_ip_rate_limiter;
use gate_core::observability::logging::init_tracing;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), gate_core::error::AppError> {
    // Load configuration - fail fast if invalid
    let config = GateConfig::from_env()?;

    init_tracing(&config.service_name, &config.log_level);

    // Initialize metrics
    gate_service::services::metrics::init_metrics();

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting gate service"
    );

    let policy = PinPolicy {
        min_len: config.pin.min_len,
        max_len: config.pin.max_len,
    };

    // Seed the credential store and member directory
    let credentials = Arc::new(
        CredentialStore::seed(policy, seed::seed_credentials())
            .map_err(gate_core::error::AppError::InternalError)?,
    );
    let congregations = credentials.congregations();
    let members = Arc::new(MemberDirectory::seed(seed::seed_members(&congregations)));
    tracing::info!(
        congregations = congregations.len(),
        members = members.len(),
        "Seed data loaded"
    );

    let sessions = Arc::new(SessionService::new(config.session.ttl_hours));
    let preferences = PreferencesService::new(Arc::new(InMemoryStore::new()));

    let gates = Arc::new(GateRegistry::new(
        credentials.clone(),
        members.clone(),
        Arc::new(TracingSink),
        policy,
        Duration::from_secs(config.gate.call_timeout_seconds),
    ));

    // Rate limiters: login, PIN submission, and a global IP ceiling
    let login_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.login_attempts,
        config.rate_limit.login_window_seconds,
    );
    let pin_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.pin_attempts,
        config.rate_limit.pin_window_seconds,
    );
    let ip_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.global_ip_limit,
        config.rate_limit.global_ip_window_seconds,
    );

    let state = AppState {
        config: config.clone(),
        credentials,
        sessions,
        gates,
        members,
        preferences,
        login_rate_limiter,
        pin_rate_limiter,
        ip_rate_limiter,
    };

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));

    let service_span = tracing::info_span!(
        "service",
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
    );
    let _guard = service_span.enter();

    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    gate_core::axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
