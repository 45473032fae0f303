//! Authoritative in-memory board for the Tower of Hanoi.
//!
//! The board owns three pegs, each an ordered stack of disks. Every disk
//! lives on exactly one peg, and no disk ever rests on a smaller one.
//! Both invariants hold before and after every committed move. The board
//! never panics; it returns errors.
//!
//! # Modules
//!
//! - [`board`] -- The [`Board`] struct: initialization, queries, and
//!   [`Board::apply_move`].
//! - [`invariants`] -- Partition and legality verification against a
//!   [`BoardSnapshot`](hanoi_types::BoardSnapshot).
//!
//! # Usage
//!
//! ```
//! use hanoi_board::Board;
//! use hanoi_types::{Move, Peg};
//!
//! let mut board = Board::with_disks(2, Peg::A).ok();
//! if let Some(board) = board.as_mut() {
//!     board.apply_move(Move::new(Peg::A, Peg::C)).ok();
//!     board.apply_move(Move::new(Peg::A, Peg::B)).ok();
//!     board.apply_move(Move::new(Peg::C, Peg::B)).ok();
//!     assert!(board.is_solved_on(Peg::B));
//! }
//! ```

pub mod board;
pub mod invariants;

pub use board::{Board, MAX_DISK_COUNT};
pub use invariants::InvariantResult;

use hanoi_types::{Move, Peg};

/// Why a move was rejected by the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalMoveReason {
    /// Source and destination are the same peg.
    SamePeg,
    /// The source peg holds no disk.
    EmptySource,
    /// The moving disk is not smaller than the destination's top disk.
    LargerOnSmaller {
        /// Rank of the disk being moved.
        moving: u32,
        /// Rank of the disk it would rest on.
        resting: u32,
    },
}

impl core::fmt::Display for IllegalMoveReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::SamePeg => f.write_str("source and destination are the same peg"),
            Self::EmptySource => f.write_str("source peg is empty"),
            Self::LargerOnSmaller { moving, resting } => {
                write!(f, "disk {moving} cannot rest on disk {resting}")
            }
        }
    }
}

/// Errors returned by board operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// The requested disk count is outside the supported range.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },

    /// The move would break the legality rule.
    #[error("illegal move {movement}: {reason}")]
    IllegalMove {
        /// The rejected move.
        movement: Move,
        /// Why it was rejected.
        reason: IllegalMoveReason,
    },

    /// The queried peg holds no disk.
    #[error("peg {0} is empty")]
    EmptyPeg(Peg),
}
