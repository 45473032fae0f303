//! The authoritative three-peg board.
//!
//! Each peg is a stack stored bottom to top: the last element is the
//! topmost disk. [`Board::apply_move`] checks legality before touching any
//! stack, so a rejected move leaves the board exactly as it was and an
//! accepted move can never break the partition or legality invariants.

use hanoi_types::{BoardSnapshot, Disk, Move, Peg};
use tracing::{debug, trace};

use crate::invariants::{self, InvariantResult};
use crate::{BoardError, IllegalMoveReason};

/// Largest disk count a board accepts.
///
/// A solution for `n` disks has `2^n - 1` moves; 24 disks already means
/// roughly 16.7 million moves, which bounds both memory and playback time.
pub const MAX_DISK_COUNT: u32 = 24;

/// Three pegs holding a fixed set of ranked disks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    /// Disks on peg A, bottom to top.
    a: Vec<Disk>,
    /// Disks on peg B, bottom to top.
    b: Vec<Disk>,
    /// Disks on peg C, bottom to top.
    c: Vec<Disk>,
    /// Number of disks placed by the last initialization.
    disk_count: u32,
}

impl Board {
    /// Create a board with no disks.
    pub const fn new() -> Self {
        Self {
            a: Vec::new(),
            b: Vec::new(),
            c: Vec::new(),
            disk_count: 0,
        }
    }

    /// Create a board with `disk_count` disks stacked on `source`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidConfiguration`] if `disk_count`
    /// exceeds [`MAX_DISK_COUNT`].
    pub fn with_disks(disk_count: u32, source: Peg) -> Result<Self, BoardError> {
        let mut board = Self::new();
        board.initialize(disk_count, source)?;
        Ok(board)
    }

    /// Reset all pegs and stack `disk_count` disks on `source`.
    ///
    /// Rank `disk_count` goes to the bottom and rank 1 ends on top, so the
    /// legality invariant holds immediately. Every disk gets a fresh
    /// identity. On error the board is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidConfiguration`] if `disk_count`
    /// exceeds [`MAX_DISK_COUNT`].
    pub fn initialize(&mut self, disk_count: u32, source: Peg) -> Result<(), BoardError> {
        if disk_count > MAX_DISK_COUNT {
            return Err(BoardError::InvalidConfiguration {
                reason: format!("disk count {disk_count} exceeds maximum {MAX_DISK_COUNT}"),
            });
        }

        self.a.clear();
        self.b.clear();
        self.c.clear();
        self.disk_count = disk_count;

        let stack = self.stack_mut(source);
        stack.extend((1..=disk_count).rev().map(Disk::new));

        debug!(disk_count, source = %source, "Board initialized");
        Ok(())
    }

    /// Return the topmost disk of `peg`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::EmptyPeg`] if the peg holds no disk.
    pub fn top_disk(&self, peg: Peg) -> Result<&Disk, BoardError> {
        self.stack(peg).last().ok_or(BoardError::EmptyPeg(peg))
    }

    /// Move the top disk of `movement.source` onto `movement.destination`.
    ///
    /// Returns the disk that was moved.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::IllegalMove`] if the pegs are equal, the
    /// source is empty, or the destination's top disk is not larger than
    /// the moving disk. The board is unchanged on error.
    pub fn apply_move(&mut self, movement: Move) -> Result<Disk, BoardError> {
        let illegal = |reason| BoardError::IllegalMove { movement, reason };

        if movement.source == movement.destination {
            return Err(illegal(IllegalMoveReason::SamePeg));
        }

        let moving = match self.top_disk(movement.source) {
            Ok(disk) => *disk,
            Err(_empty) => return Err(illegal(IllegalMoveReason::EmptySource)),
        };

        if let Ok(resting) = self.top_disk(movement.destination) {
            if resting.rank() <= moving.rank() {
                return Err(illegal(IllegalMoveReason::LargerOnSmaller {
                    moving: moving.rank(),
                    resting: resting.rank(),
                }));
            }
        }

        let lifted = self
            .stack_mut(movement.source)
            .pop()
            .ok_or_else(|| illegal(IllegalMoveReason::EmptySource))?;
        self.stack_mut(movement.destination).push(lifted);

        trace!(movement = %movement, rank = lifted.rank(), "Disk moved");
        Ok(lifted)
    }

    /// Return an independent copy of every peg's stack.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            a: self.a.clone(),
            b: self.b.clone(),
            c: self.c.clone(),
        }
    }

    /// Number of disks on the board.
    pub const fn disk_count(&self) -> u32 {
        self.disk_count
    }

    /// Disks on `peg`, bottom to top.
    pub fn stack(&self, peg: Peg) -> &[Disk] {
        match peg {
            Peg::A => &self.a,
            Peg::B => &self.b,
            Peg::C => &self.c,
        }
    }

    /// Return `true` if every disk is stacked on `peg`.
    pub fn is_solved_on(&self, peg: Peg) -> bool {
        usize::try_from(self.disk_count).is_ok_and(|count| self.stack(peg).len() == count)
    }

    /// Check the partition and legality invariants.
    ///
    /// Both hold by construction; this exists for tests and for callers
    /// that receive a board from elsewhere.
    pub fn verify(&self) -> InvariantResult {
        invariants::verify_snapshot(&self.snapshot(), self.disk_count)
    }

    /// Mutable access to the stack on `peg`.
    fn stack_mut(&mut self, peg: Peg) -> &mut Vec<Disk> {
        match peg {
            Peg::A => &mut self.a,
            Peg::B => &mut self.b,
            Peg::C => &mut self.c,
        }
    }
}
