//! The classical divide-and-conquer Tower of Hanoi solver.
//!
//! To move `n` disks from `source` to `destination`:
//!
//! 1. move `n - 1` disks from `source` to `auxiliary`,
//! 2. move the largest disk from `source` to `destination`,
//! 3. move `n - 1` disks from `auxiliary` to `destination`.
//!
//! The emission order is part of the contract: the resulting sequence is
//! legal at every intermediate step when played against a freshly
//! initialized board. The solver holds no state and never touches a board,
//! so any number of callers may use it concurrently.

use hanoi_board::MAX_DISK_COUNT;
use hanoi_types::{Move, MoveSequence, Peg};
use tracing::debug;

/// Errors that can occur when solving.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SolverError {
    /// The pegs are not pairwise distinct, or the disk count is too large.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Explanation of what is wrong with the request.
        reason: String,
    },
}

/// Number of moves in the minimal solution for `disk_count` disks.
///
/// Returns `2^disk_count - 1`, or `None` if that does not fit in `usize`.
pub fn move_count(disk_count: u32) -> Option<usize> {
    1_usize.checked_shl(disk_count)?.checked_sub(1)
}

/// Produce the minimal move sequence for `disk_count` disks.
///
/// The result has exactly `2^disk_count - 1` moves. Identical arguments
/// always yield an identical sequence.
///
/// # Errors
///
/// Returns [`SolverError::InvalidConfiguration`] if the pegs are not
/// pairwise distinct or `disk_count` exceeds the board's
/// [`MAX_DISK_COUNT`].
pub fn solve(
    disk_count: u32,
    source: Peg,
    destination: Peg,
    auxiliary: Peg,
) -> Result<MoveSequence, SolverError> {
    if !Peg::all_distinct(source, destination, auxiliary) {
        return Err(SolverError::InvalidConfiguration {
            reason: format!(
                "pegs must be pairwise distinct, got {source}, {destination}, {auxiliary}"
            ),
        });
    }
    if disk_count > MAX_DISK_COUNT {
        return Err(SolverError::InvalidConfiguration {
            reason: format!("disk count {disk_count} exceeds maximum {MAX_DISK_COUNT}"),
        });
    }
    let capacity = move_count(disk_count).ok_or_else(|| SolverError::InvalidConfiguration {
        reason: format!("move count for {disk_count} disks overflows"),
    })?;

    let mut moves = Vec::with_capacity(capacity);
    emit(disk_count, source, destination, auxiliary, &mut moves);

    debug!(
        disk_count,
        source = %source,
        destination = %destination,
        moves = moves.len(),
        "Solved"
    );
    Ok(MoveSequence::new(moves))
}

/// Append the moves for `disk_count` disks to `out`.
///
/// Recursion depth equals `disk_count`, which the caller bounds.
fn emit(disk_count: u32, source: Peg, destination: Peg, auxiliary: Peg, out: &mut Vec<Move>) {
    let Some(smaller) = disk_count.checked_sub(1) else {
        return;
    };
    emit(smaller, source, auxiliary, destination, out);
    out.push(Move::new(source, destination));
    emit(smaller, auxiliary, destination, source, out);
}
