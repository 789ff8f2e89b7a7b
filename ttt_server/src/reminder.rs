//! Periodic move reminders.
//!
//! A background task sweeps the games still marked active on a fixed
//! interval and nudges whoever holds the turn in each one. The sweep
//! doubles as the refresh point for the active-games gauge.

use std::sync::Arc;

use tictactoe::{NotificationDispatcher, NotificationKind, SessionManager};
use tokio::time::{Duration, interval};

use crate::metrics;

/// Runs forever, sweeping once per `interval_secs`.
///
/// The first sweep happens one full interval after startup, not at boot.
pub async fn run(
    manager: SessionManager,
    dispatcher: Arc<dyn NotificationDispatcher>,
    interval_secs: u64,
) {
    let mut ticker = interval(Duration::from_secs(interval_secs));
    // interval fires immediately on the first tick; consume it
    ticker.tick().await;

    loop {
        ticker.tick().await;
        match manager.active_sessions().await {
            Ok(views) => {
                metrics::active_games(views.len());
                for view in &views {
                    dispatcher
                        .notify(&view.turn_holder, view.id, NotificationKind::Reminder)
                        .await;
                }
                if !views.is_empty() {
                    tracing::info!("sent {} move reminder(s)", views.len());
                }
            }
            Err(e) => {
                tracing::warn!("reminder sweep failed: {}", e);
            }
        }
    }
}
