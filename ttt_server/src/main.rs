//! Tic-tac-toe game server using async actor model.
//!
//! This server spawns a SessionActor per live game managed by
//! SessionManager, with database-backed player registration, score
//! history, and best-effort notifications.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use log::info;
use pico_args::Arguments;
use tictactoe::{
    ChannelDispatcher, Database, SessionManager,
    db::{
        PgPlayerRegistry, PgScoreHistory, PgSessionStore, PlayerRegistry, ScoreHistory,
        SessionStore,
    },
    notify::NotificationDispatcher,
};
use ttt_server::{api, config::ServerConfig, logging, metrics, notifier, reminder};

const HELP: &str = "\
Run a tic-tac-toe game server

USAGE:
  ttt_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --db-url     URL         Database connection string  [default: env DATABASE_URL or postgres://postgres@localhost/tictactoe_db]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  METRICS_BIND             Prometheus exporter address (unset = disabled)
  DATABASE_URL             PostgreSQL connection string
  REMINDER_INTERVAL_SECS   Seconds between move-reminder sweeps
  NOTIFICATION_CAPACITY    Bound of the notification channel
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind_override: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let database_url_override: Option<String> = pargs.opt_value_from_str("--db-url")?;

    logging::init();

    let config = ServerConfig::from_env(bind_override, database_url_override)?;
    config.validate()?;

    info!("Starting tic-tac-toe server at {}", config.bind);

    if let Some(metrics_addr) = config.metrics_bind {
        metrics::init_metrics(metrics_addr).map_err(Error::msg)?;
        info!("Prometheus metrics exposed at http://{metrics_addr}/metrics");
    }

    // Initialize database
    info!("Connecting to database: {}", config.database.database_url);
    let db = Database::new(&config.database)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;

    info!("Database connected successfully");

    // Create repositories and the session manager
    let pool = db.pool().clone();
    let registry: Arc<dyn PlayerRegistry> = Arc::new(PgPlayerRegistry::new(pool.clone()));
    let store: Arc<dyn SessionStore> = Arc::new(PgSessionStore::new(pool.clone()));
    let scores: Arc<dyn ScoreHistory> = Arc::new(PgScoreHistory::new(pool));

    let (dispatcher, notification_receiver) =
        ChannelDispatcher::new(config.notification_capacity);
    let dispatcher: Arc<dyn NotificationDispatcher> = Arc::new(dispatcher);

    let manager = SessionManager::new(
        registry.clone(),
        store.clone(),
        scores.clone(),
        dispatcher.clone(),
    );

    // Bring games that were in progress before the last shutdown back up
    let restored = manager
        .load_existing_sessions()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to restore sessions: {}", e))?;
    info!("✓ Restored {restored} active game(s)");

    // Background tasks: notification delivery and move reminders
    tokio::spawn(notifier::run(notification_receiver, registry.clone()));
    tokio::spawn(reminder::run(
        manager.clone(),
        dispatcher.clone(),
        config.reminder_interval_secs,
    ));

    // Create API state
    let api_state = api::AppState {
        manager,
        registry,
        scores,
        store,
    };

    // Create router
    let app = api::create_router(api_state);

    // Start HTTP server
    info!("Starting HTTP server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");
    db.close().await;

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
}
