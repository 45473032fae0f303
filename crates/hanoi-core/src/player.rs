//! The async step loop that plays a move sequence against a board.
//!
//! [`play`] walks the sequence one move at a time. For each move it emits
//! `MoveStarted`, applies the move, emits `MoveCompleted` with a fresh
//! snapshot, and then waits out the current step duration. Cancellation is
//! checked only at move boundaries, so the board is always left fully
//! legal when playback stops.
//!
//! The loop does not know about channels or the sequencer state machine;
//! it reports through a [`PlaybackObserver`].

use hanoi_board::{Board, BoardError};
use hanoi_types::{Move, MoveSequence, PlaybackEvent, SessionId};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::control::PlaybackControl;

/// Errors that halt playback.
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    /// The board rejected a move. For a solver-generated sequence against
    /// a freshly initialized board of matching size this is a programming
    /// defect, never a recoverable condition.
    #[error("move {index} ({movement}) rejected: {source}")]
    IllegalMove {
        /// Position of the rejected move in the sequence.
        index: usize,
        /// The rejected move.
        movement: Move,
        /// The board's rejection.
        source: BoardError,
    },
}

/// How a playback session ended without fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaybackOutcome {
    /// Every move was applied.
    Finished,
    /// Playback stopped at a move boundary on request.
    Cancelled {
        /// Index of the last committed move, or `None` if none was applied.
        last_completed_index: Option<usize>,
    },
}

/// Result of a playback session that ended without fault.
#[derive(Debug)]
pub struct PlaybackReport {
    /// The session that produced this report.
    pub session_id: SessionId,
    /// Why playback ended.
    pub outcome: PlaybackOutcome,
    /// The board, handed back to the caller in its final state.
    pub board: Board,
    /// Number of moves committed to the board.
    pub moves_applied: usize,
    /// Number of moves in the sequence.
    pub total_moves: usize,
}

/// Receives every event of a playback session, in order.
///
/// The player awaits each call before moving on, so an observer that
/// forwards to a slow consumer holds playback back rather than losing
/// events.
pub trait PlaybackObserver: Send {
    /// Called for each event as it happens.
    fn on_event(&mut self, event: &PlaybackEvent) -> impl Future<Output = ()> + Send;
}

/// An observer that discards every event.
pub struct NoOpObserver;

impl PlaybackObserver for NoOpObserver {
    fn on_event(&mut self, _event: &PlaybackEvent) -> impl Future<Output = ()> + Send {
        std::future::ready(())
    }
}

/// Play `moves` against `board` until the sequence ends or cancellation is
/// requested through `control`.
///
/// The board is moved in and returned inside the [`PlaybackReport`]; no
/// one else can touch it while playback runs. A cancellation that lands in
/// the wait after the final move still ends in `Finished`, because every
/// move has been applied.
///
/// # Errors
///
/// Returns [`PlaybackError::IllegalMove`] if the board rejects a move. A
/// `SequenceFaulted` event is emitted first.
pub async fn play<O: PlaybackObserver>(
    mut board: Board,
    moves: &MoveSequence,
    control: &PlaybackControl,
    observer: &mut O,
) -> Result<PlaybackReport, PlaybackError> {
    let session_id = control.session_id();
    let total_moves = moves.len();
    let mut moves_applied: usize = 0;
    let mut last_completed_index: Option<usize> = None;

    info!(
        %session_id,
        total_moves,
        disk_count = board.disk_count(),
        step_duration = ?control.step_duration(),
        "Playback starting"
    );

    for (index, movement) in moves.iter().copied().enumerate() {
        // --- Check cancellation (move boundary) ---
        if control.is_cancel_requested() {
            info!(%session_id, ?last_completed_index, "Playback cancelled");
            observer
                .on_event(&PlaybackEvent::SequenceCancelled {
                    last_completed_index,
                })
                .await;
            return Ok(PlaybackReport {
                session_id,
                outcome: PlaybackOutcome::Cancelled {
                    last_completed_index,
                },
                board,
                moves_applied,
                total_moves,
            });
        }

        // --- Apply move ---
        observer
            .on_event(&PlaybackEvent::MoveStarted { index, movement })
            .await;

        if let Err(source) = board.apply_move(movement) {
            error!(
                %session_id,
                index,
                movement = %movement,
                error = %source,
                "Board rejected move, halting playback"
            );
            observer
                .on_event(&PlaybackEvent::SequenceFaulted {
                    index,
                    reason: source.to_string(),
                })
                .await;
            return Err(PlaybackError::IllegalMove {
                index,
                movement,
                source,
            });
        }

        moves_applied = moves_applied.saturating_add(1);
        last_completed_index = Some(index);
        control.record_move_completed();
        debug!(%session_id, index, movement = %movement, "Move completed");

        observer
            .on_event(&PlaybackEvent::MoveCompleted {
                index,
                movement,
                snapshot: board.snapshot(),
            })
            .await;

        // --- Wait for the next boundary ---
        control.wait_step().await;
    }

    info!(%session_id, total_moves, "Playback finished");
    observer
        .on_event(&PlaybackEvent::SequenceFinished { total_moves })
        .await;

    Ok(PlaybackReport {
        session_id,
        outcome: PlaybackOutcome::Finished,
        board,
        moves_applied,
        total_moves,
    })
}

/// Log the end of a playback session.
pub fn log_playback_end(report: &PlaybackReport) {
    match report.outcome {
        PlaybackOutcome::Finished => info!(
            session_id = %report.session_id,
            moves_applied = report.moves_applied,
            "Playback ended: all moves applied"
        ),
        PlaybackOutcome::Cancelled {
            last_completed_index,
        } => warn!(
            session_id = %report.session_id,
            moves_applied = report.moves_applied,
            total_moves = report.total_moves,
            ?last_completed_index,
            "Playback ended early: cancelled"
        ),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use hanoi_types::Peg;
    use tokio::time::Instant;

    use super::*;
    use crate::solver::solve;

    /// Observer that keeps every event for inspection.
    #[derive(Default)]
    struct Recorder {
        events: Vec<PlaybackEvent>,
    }

    impl PlaybackObserver for Recorder {
        fn on_event(&mut self, event: &PlaybackEvent) -> impl Future<Output = ()> + Send {
            self.events.push(event.clone());
            std::future::ready(())
        }
    }

    #[tokio::test]
    async fn empty_sequence_only_finishes() {
        let moves = solve(0, Peg::A, Peg::B, Peg::C).unwrap();
        let board = Board::with_disks(0, Peg::A).unwrap();
        let control = PlaybackControl::new(Duration::ZERO, moves.len());
        let mut recorder = Recorder::default();

        let report = play(board, &moves, &control, &mut recorder).await.unwrap();

        assert_eq!(report.outcome, PlaybackOutcome::Finished);
        assert_eq!(
            recorder.events,
            vec![PlaybackEvent::SequenceFinished { total_moves: 0 }]
        );
    }

    #[tokio::test]
    async fn single_disk_event_order() {
        let moves = solve(1, Peg::A, Peg::B, Peg::C).unwrap();
        let board = Board::with_disks(1, Peg::A).unwrap();
        let control = PlaybackControl::new(Duration::ZERO, moves.len());
        let mut recorder = Recorder::default();

        let report = play(board, &moves, &control, &mut recorder).await.unwrap();

        assert_eq!(recorder.events.len(), 3);
        assert!(matches!(
            recorder.events.first(),
            Some(PlaybackEvent::MoveStarted { index: 0, .. })
        ));
        match recorder.events.get(1) {
            Some(PlaybackEvent::MoveCompleted {
                index, snapshot, ..
            }) => {
                assert_eq!(*index, 0);
                assert!(snapshot.peg(Peg::A).is_empty());
                assert_eq!(snapshot.ranks(Peg::B), vec![1]);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(
            recorder.events.get(2),
            Some(&PlaybackEvent::SequenceFinished { total_moves: 1 })
        );
        assert_eq!(report.moves_applied, 1);
        assert!(report.board.is_solved_on(Peg::B));
    }

    #[tokio::test]
    async fn cancel_before_first_move() {
        let moves = solve(3, Peg::A, Peg::B, Peg::C).unwrap();
        let board = Board::with_disks(3, Peg::A).unwrap();
        let control = PlaybackControl::new(Duration::ZERO, moves.len());
        control.request_cancel();
        let mut recorder = Recorder::default();

        let report = play(board, &moves, &control, &mut recorder).await.unwrap();

        assert_eq!(
            report.outcome,
            PlaybackOutcome::Cancelled {
                last_completed_index: None
            }
        );
        assert_eq!(report.moves_applied, 0);
        assert_eq!(report.board.snapshot().ranks(Peg::A), vec![3, 2, 1]);
        assert_eq!(
            recorder.events,
            vec![PlaybackEvent::SequenceCancelled {
                last_completed_index: None
            }]
        );
    }

    #[tokio::test]
    async fn mismatched_board_faults() {
        // Three-disk solution against a two-disk board runs out of disks.
        let moves = solve(3, Peg::A, Peg::B, Peg::C).unwrap();
        let board = Board::with_disks(2, Peg::A).unwrap();
        let control = PlaybackControl::new(Duration::ZERO, moves.len());
        let mut recorder = Recorder::default();

        let err = play(board, &moves, &control, &mut recorder)
            .await
            .unwrap_err();

        let PlaybackError::IllegalMove { index, .. } = err;
        assert!(matches!(
            recorder.events.last(),
            Some(PlaybackEvent::SequenceFaulted { index: i, .. }) if *i == index
        ));
        assert!(
            !recorder
                .events
                .iter()
                .any(|e| matches!(e, PlaybackEvent::SequenceFinished { .. }))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn waits_between_moves() {
        let moves = solve(2, Peg::A, Peg::B, Peg::C).unwrap();
        let board = Board::with_disks(2, Peg::A).unwrap();
        let control = PlaybackControl::new(Duration::from_millis(100), moves.len());
        let begin = Instant::now();

        play(board, &moves, &control, &mut NoOpObserver)
            .await
            .unwrap();

        let elapsed = begin.elapsed();
        assert!(elapsed >= Duration::from_millis(300), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(330), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_during_wait_stops_at_boundary() {
        let moves = solve(3, Peg::A, Peg::B, Peg::C).unwrap();
        let board = Board::with_disks(3, Peg::A).unwrap();
        let control = Arc::new(PlaybackControl::new(
            Duration::from_millis(100),
            moves.len(),
        ));

        let canceller = Arc::clone(&control);
        tokio::spawn(async move {
            // Lands inside the wait that follows move index 1.
            tokio::time::sleep(Duration::from_millis(150)).await;
            canceller.request_cancel();
        });

        let mut recorder = Recorder::default();
        let report = play(board, &moves, &control, &mut recorder).await.unwrap();

        assert_eq!(
            report.outcome,
            PlaybackOutcome::Cancelled {
                last_completed_index: Some(1)
            }
        );
        assert_eq!(report.moves_applied, 2);
        assert!(report.board.verify().holds());
        assert_eq!(report.board.snapshot().ranks(Peg::A), vec![3]);
        assert_eq!(report.board.snapshot().ranks(Peg::B), vec![1]);
        assert_eq!(report.board.snapshot().ranks(Peg::C), vec![2]);
        assert_eq!(control.moves_completed(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_last_move_still_finishes() {
        let moves = solve(1, Peg::A, Peg::B, Peg::C).unwrap();
        let board = Board::with_disks(1, Peg::A).unwrap();
        let control = Arc::new(PlaybackControl::new(
            Duration::from_millis(100),
            moves.len(),
        ));

        let canceller = Arc::clone(&control);
        tokio::spawn(async move {
            // Lands inside the wait that follows the only move.
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.request_cancel();
        });

        let mut recorder = Recorder::default();
        let begin = Instant::now();
        let report = play(board, &moves, &control, &mut recorder).await.unwrap();

        assert_eq!(report.outcome, PlaybackOutcome::Finished);
        assert!(begin.elapsed() < Duration::from_millis(100));
        assert!(control.is_cancel_requested());
        assert_eq!(
            recorder.events.last(),
            Some(&PlaybackEvent::SequenceFinished { total_moves: 1 })
        );
    }
}
