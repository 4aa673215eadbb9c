//! Circulate Server - Library Circulation System
//!
//! REST API server around the lending/reservation concurrency engine.

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use circulate_server::{
    api,
    clock::SystemClock,
    config::AppConfig,
    services::{
        maintenance,
        notifications::{NotificationSink, SmtpSink, TracingSink},
        Services,
    },
    store::Store,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            format!("circulate_server={},tower_http=debug", config.logging.level).into()
        });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Circulate Server v{}", env!("CARGO_PKG_VERSION"));

    // Notification delivery is a collaborator; without SMTP configured the
    // sink degrades to the log stream
    let notifier: Arc<dyn NotificationSink> = if config.email.enabled {
        tracing::info!("SMTP notification sink enabled ({})", config.email.smtp_host);
        Arc::new(SmtpSink::new(config.email.clone()))
    } else {
        Arc::new(TracingSink)
    };

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create store and services
    let store = Store::new();
    let services = Services::new(
        store,
        &config.rules,
        &config.scheduler,
        Arc::new(SystemClock),
        notifier,
    );

    // Start the periodic sweeps
    maintenance::spawn_timers(services.maintenance.clone(), &config.scheduler);
    tracing::info!("Maintenance sweep timers started");

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Loans
        .route("/loans", post(api::loans::create_loan))
        .route("/loans/overdue", get(api::loans::get_overdue_loans))
        .route("/loans/:id/return", post(api::loans::return_loan))
        .route("/patrons/:id/loans", get(api::loans::get_patron_loans))
        // Reservations
        .route("/reservations", post(api::reservations::create_reservation))
        .route(
            "/reservations/:id/cancel",
            post(api::reservations::cancel_reservation),
        )
        .route(
            "/patrons/:id/reservations",
            get(api::reservations::get_patron_reservations),
        )
        // Maintenance
        .route("/maintenance/sweep", post(api::maintenance::run_sweep))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
