//! Structured logging configuration.
//!
//! Console logging through `tracing`, with records from the `log` facade
//! (used by the game library) bridged into the same subscriber.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging.
///
/// Log levels are configurable via the `RUST_LOG` env var; the default
/// filter keeps dependency chatter down.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=warn"));

    // Console layer for development
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a game lifecycle event with structured data
///
/// # Arguments
///
/// * `event_type` - Event name (e.g. "game_started", "move_played")
/// * `session_id` - Game the event belongs to
/// * `player` - Acting player, when there is one
/// * `message` - Human-readable summary
pub fn log_game_event(event_type: &str, session_id: &str, player: Option<&str>, message: &str) {
    tracing::info!(
        event_type = event_type,
        session_id = session_id,
        player = player,
        "GAME: {}",
        message
    );
}
