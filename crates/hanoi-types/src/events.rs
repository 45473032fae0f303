//! Playback events published by the sequencer.
//!
//! A presentation layer subscribes to these to animate the puzzle. It
//! never mutates the board; the [`BoardSnapshot`] carried by
//! [`PlaybackEvent::MoveCompleted`] is everything it needs to redraw.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::structs::{BoardSnapshot, Move};

/// A lifecycle event emitted while a move sequence is played back.
///
/// Events of one session arrive strictly in order: for every index `i`,
/// `MoveStarted(i)` precedes `MoveCompleted(i)`, which precedes
/// `MoveStarted(i + 1)`. Exactly one terminal event closes a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PlaybackEvent {
    /// A move is about to be applied.
    MoveStarted {
        /// Zero-based position of the move in the sequence.
        index: usize,
        /// The move being applied.
        movement: Move,
    },
    /// A move has been committed to the board.
    MoveCompleted {
        /// Zero-based position of the move in the sequence.
        index: usize,
        /// The move that was applied.
        movement: Move,
        /// Board state immediately after the move.
        snapshot: BoardSnapshot,
    },
    /// Every move in the sequence has been applied.
    SequenceFinished {
        /// Number of moves that were played.
        total_moves: usize,
    },
    /// Playback stopped at a move boundary on request.
    SequenceCancelled {
        /// Index of the last move committed before stopping, or `None` if
        /// no move was applied.
        last_completed_index: Option<usize>,
    },
    /// A move was rejected by the board and playback halted.
    SequenceFaulted {
        /// Index of the rejected move.
        index: usize,
        /// Human-readable description of the rejection.
        reason: String,
    },
}

impl PlaybackEvent {
    /// Return `true` if this event closes a playback session.
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::SequenceFinished { .. }
                | Self::SequenceCancelled { .. }
                | Self::SequenceFaulted { .. }
        )
    }
}
