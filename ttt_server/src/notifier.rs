//! Notification delivery task.
//!
//! Drains the in-process notification channel and renders each event as a
//! player-facing message. Delivery here is log-based; swapping in an email
//! or push transport only touches this module, because game flow never
//! waits on delivery.

use std::sync::Arc;

use tictactoe::{Notification, NotificationKind, db::PlayerRegistry};
use tokio::sync::mpsc;

use crate::metrics;

/// Renders the message body for a notification.
///
/// Winner congratulations pull the recipient's record from the registry so
/// the message can quote their standing.
async fn render(notification: &Notification, registry: &Arc<dyn PlayerRegistry>) -> String {
    let recipient = notification.recipient.as_str();
    let session_id = notification.session_id;
    match notification.kind {
        NotificationKind::YourTurn => format!(
            "Hi {recipient}, your opponent has made a move! Now it's your turn to play. \
             The game key is: {session_id}"
        ),
        NotificationKind::YouWon => match registry.resolve(&notification.recipient).await {
            Ok(Some(record)) => format!(
                "Congratulations {recipient}, for completing the game {session_id}. \
                 You have won {} game(s). Your win rate is {:.1}%. Keep it up!",
                record.won,
                record.win_rate()
            ),
            _ => format!(
                "Congratulations {recipient}, for completing the game {session_id}. Keep it up!"
            ),
        },
        NotificationKind::OpponentForfeited => format!(
            "Hi {recipient}, your opponent has surrendered! The game key is: {session_id}"
        ),
        NotificationKind::GameTied => {
            format!("The game {session_id} has tied! Thank you for playing!")
        }
        NotificationKind::Reminder => format!(
            "Hi {recipient}, you have a game in progress. The game key is: {session_id}"
        ),
    }
}

/// Runs until the notification channel closes.
pub async fn run(mut receiver: mpsc::Receiver<Notification>, registry: Arc<dyn PlayerRegistry>) {
    while let Some(notification) = receiver.recv().await {
        let body = render(&notification, &registry).await;
        tracing::info!(
            recipient = %notification.recipient,
            session_id = %notification.session_id,
            kind = %notification.kind,
            "NOTIFY: {}",
            body
        );
        metrics::notifications_sent_total(&notification.kind.to_string());
    }
    tracing::info!("Notification channel closed, delivery task exiting");
}
