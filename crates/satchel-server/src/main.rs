mod routes;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{Router, routing::{get, post}};
use tower_http::trace::TraceLayer;
use tracing::info;

use satchel_bot::{BotApi, Engine, Notifier, SystemDateParser, TelegramClient};
use satchel_db::Database;

use crate::routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "satchel_server=debug,satchel_bot=debug,satchel_db=debug,tower_http=debug".into()
            }),
        )
        .init();

    // Config
    let bot_token = std::env::var("SATCHEL_BOT_TOKEN").unwrap_or_default();
    if bot_token.is_empty() {
        eprintln!("FATAL: SATCHEL_BOT_TOKEN is unset.");
        eprintln!("       Create a bot with @BotFather and put its token in your .env file.");
        std::process::exit(1);
    }

    let host = std::env::var("SATCHEL_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("SATCHEL_PORT")
        .unwrap_or_else(|_| "3100".into())
        .parse()?;
    let db_path: PathBuf = std::env::var("SATCHEL_DB_PATH")
        .unwrap_or_else(|_| "satchel.db".into())
        .into();
    let sweep_interval_secs: u64 = std::env::var("SATCHEL_SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(900); // 15 minutes

    let db = Arc::new(Database::open(&db_path)?);

    let api: Arc<dyn BotApi> = Arc::new(TelegramClient::new(&bot_token));
    let notifier = Notifier::new(api);
    let engine = Arc::new(Engine::new(
        db.clone(),
        notifier.clone(),
        Arc::new(SystemDateParser),
    ));

    // Background reminder sweep
    tokio::spawn(satchel_bot::run_sweep_loop(db, notifier, sweep_interval_secs));

    let state = AppState { engine };

    let app = Router::new()
        .route("/", get(routes::liveness))
        .route("/webhook", post(routes::webhook).get(routes::liveness))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Satchel bot server listening on {}", addr);
    info!("Reminder sweep every {} seconds", sweep_interval_secs);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
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
