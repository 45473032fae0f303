//! Event subscriber that logs playback as it happens.
//!
//! This stands in for a presentation layer: it consumes the sequencer's
//! event queue, never touches the board, and renders each event as a
//! structured log line plus the event's JSON form.

use hanoi_types::{Peg, PlaybackEvent};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Log every event until the session's terminal event arrives.
///
/// Returns the number of events logged.
pub async fn log_events(mut rx: mpsc::Receiver<PlaybackEvent>) -> usize {
    let mut logged: usize = 0;
    while let Some(event) = rx.recv().await {
        log_event(&event);
        logged = logged.saturating_add(1);
        if event.is_terminal() {
            return logged;
        }
    }
    debug!("Event channel closed");
    logged
}

/// Render one event as a log line.
fn log_event(event: &PlaybackEvent) {
    let json = serde_json::to_string(event).unwrap_or_default();
    match event {
        PlaybackEvent::MoveStarted { index, movement } => {
            debug!(index, movement = %movement, event = %json, "Move started");
        }
        PlaybackEvent::MoveCompleted {
            index,
            movement,
            snapshot,
        } => {
            info!(
                index,
                movement = %movement,
                a = ?snapshot.ranks(Peg::A),
                b = ?snapshot.ranks(Peg::B),
                c = ?snapshot.ranks(Peg::C),
                "Move completed"
            );
            debug!(event = %json, "Move completed payload");
        }
        PlaybackEvent::SequenceFinished { total_moves } => {
            info!(total_moves, "Sequence finished");
        }
        PlaybackEvent::SequenceCancelled {
            last_completed_index,
        } => {
            warn!(?last_completed_index, "Sequence cancelled");
        }
        PlaybackEvent::SequenceFaulted { index, reason } => {
            error!(index, reason = %reason, "Sequence faulted");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hanoi_types::Move;

    use super::*;

    #[tokio::test]
    async fn stops_at_terminal_event() {
        let (tx, rx) = mpsc::channel(16);
        tx.send(PlaybackEvent::MoveStarted {
            index: 0,
            movement: Move::new(Peg::A, Peg::B),
        })
        .await
        .unwrap();
        tx.send(PlaybackEvent::SequenceCancelled {
            last_completed_index: None,
        })
        .await
        .unwrap();
        tx.send(PlaybackEvent::SequenceFinished { total_moves: 0 })
            .await
            .unwrap();

        assert_eq!(log_events(rx).await, 2);
    }

    #[tokio::test]
    async fn stops_when_channel_closes() {
        let (tx, rx) = mpsc::channel::<PlaybackEvent>(4);
        drop(tx);
        assert_eq!(log_events(rx).await, 0);
    }
}
