use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use aula_api::auth::{self, AppState, AppStateInner};
use aula_api::{attendance, classrooms, reservations, sensors};
use aula_engine::clock::{Clock, SystemClock};
use aula_engine::sweeper;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aula=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("AULA_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("AULA_DB_PATH").unwrap_or_else(|_| "aula.db".into());
    let host = std::env::var("AULA_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("AULA_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let sweep_interval_secs: u64 = std::env::var("AULA_SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(300); // 5 minutes

    // Init database (creates schema and seeds classrooms on first run)
    let db = Arc::new(aula_db::Database::open(&PathBuf::from(&db_path))?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Background sweep task resets classrooms between classes
    tokio::spawn(sweeper::run_sweep_loop(
        db.clone(),
        clock.clone(),
        sweep_interval_secs,
    ));

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        db,
        clock,
        jwt_secret,
    });

    // Routes
    let api = Router::new()
        .route("/health", get(health))
        .route("/classrooms", get(classrooms::list_classrooms))
        .route("/classrooms/{id}/seats", get(classrooms::list_seats))
        .route(
            "/classrooms/{id}/seats/{date}",
            get(classrooms::list_seats_for_date),
        )
        .route("/classrooms/{id}/schedule", get(classrooms::list_schedule))
        .route("/seats/reserve", post(reservations::reserve_seat))
        .route("/seat/update", post(sensors::update_seat))
        .route("/attendance", post(attendance::record_attendance))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Aula server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
