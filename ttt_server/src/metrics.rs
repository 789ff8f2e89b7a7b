//! Prometheus metrics for monitoring game server health.
//!
//! Metrics are exposed in Prometheus text format on a dedicated listener
//! (`METRICS_BIND`) for scraping by monitoring systems.
//!
//! # Metrics Categories
//!
//! - **Game Metrics**: Games started/completed, moves played, active games
//! - **Player Metrics**: Registrations
//! - **Notification Metrics**: Deliveries by kind

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Sets up a Prometheus scrape endpoint on the specified address.
/// Metrics will be available at `http://<addr>/metrics`.
///
/// # Errors
///
/// Returns an error message if the exporter cannot bind or install.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// Game Metrics
// ============================================================================

/// Increment started games counter.
pub fn games_started_total() {
    metrics::counter!("games_started_total").increment(1);
}

/// Increment completed games counter with the ending kind as a label.
pub fn games_completed_total(ending: &str) {
    metrics::counter!("games_completed_total",
        "ending" => ending.to_string()
    )
    .increment(1);
}

/// Increment accepted moves counter.
pub fn moves_played_total() {
    metrics::counter!("moves_played_total").increment(1);
}

/// Set current active games count.
pub fn active_games(count: usize) {
    metrics::gauge!("active_games").set(count as f64);
}

// ============================================================================
// Player Metrics
// ============================================================================

/// Increment player registrations counter.
pub fn players_registered_total() {
    metrics::counter!("players_registered_total").increment(1);
}

// ============================================================================
// Notification Metrics
// ============================================================================

/// Increment delivered notifications counter with the kind as a label.
pub fn notifications_sent_total(kind: &str) {
    metrics::counter!("notifications_sent_total",
        "kind" => kind.to_string()
    )
    .increment(1);
}
