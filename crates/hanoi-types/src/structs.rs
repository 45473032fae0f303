//! Core value types: disks, moves, move sequences, and board snapshots.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Peg;
use crate::ids::DiskId;

// ---------------------------------------------------------------------------
// Disk
// ---------------------------------------------------------------------------

/// An immutable, ranked disk.
///
/// The rank (1..=N, larger is wider) alone decides move legality. The
/// [`DiskId`] stays with the disk across moves so a renderer can follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Disk {
    /// Stable identity of the disk.
    id: DiskId,
    /// Size rank; unique within a puzzle instance.
    rank: u32,
}

impl Disk {
    /// Create a disk of the given rank with a fresh identity.
    pub fn new(rank: u32) -> Self {
        Self {
            id: DiskId::new(),
            rank,
        }
    }

    /// Return the disk's stable identity.
    pub const fn id(&self) -> DiskId {
        self.id
    }

    /// Return the disk's size rank.
    pub const fn rank(&self) -> u32 {
        self.rank
    }
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

/// Relocation of the current top disk of `source` onto `destination`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Move {
    /// Peg the top disk is taken from.
    pub source: Peg,
    /// Peg the disk is placed onto.
    pub destination: Peg,
}

impl Move {
    /// Construct a move between two pegs.
    ///
    /// A move whose pegs are equal is representable but never legal; the
    /// board rejects it when applied.
    pub const fn new(source: Peg, destination: Peg) -> Self {
        Self {
            source,
            destination,
        }
    }
}

impl core::fmt::Display for Move {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}

// ---------------------------------------------------------------------------
// Move sequence
// ---------------------------------------------------------------------------

/// An ordered, immutable list of moves produced by a single solve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MoveSequence {
    moves: Vec<Move>,
}

impl MoveSequence {
    /// Freeze a list of moves into a sequence.
    pub const fn new(moves: Vec<Move>) -> Self {
        Self { moves }
    }

    /// Number of moves in the sequence.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Return `true` if the sequence has no moves.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Return the move at `index`, if any.
    pub fn get(&self, index: usize) -> Option<Move> {
        self.moves.get(index).copied()
    }

    /// Borrow the moves as a slice.
    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }

    /// Iterate over the moves in playback order.
    pub fn iter(&self) -> core::slice::Iter<'_, Move> {
        self.moves.iter()
    }
}

impl<'a> IntoIterator for &'a MoveSequence {
    type Item = &'a Move;
    type IntoIter = core::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}

// ---------------------------------------------------------------------------
// Board snapshot
// ---------------------------------------------------------------------------

/// An independent, read-only copy of every peg's stack.
///
/// Each stack is ordered bottom to top: the last element is the topmost
/// disk. Holding a snapshot never aliases live board state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BoardSnapshot {
    /// Disks on peg A, bottom to top.
    pub a: Vec<Disk>,
    /// Disks on peg B, bottom to top.
    pub b: Vec<Disk>,
    /// Disks on peg C, bottom to top.
    pub c: Vec<Disk>,
}

impl BoardSnapshot {
    /// Disks on `peg`, bottom to top.
    pub fn peg(&self, peg: Peg) -> &[Disk] {
        match peg {
            Peg::A => &self.a,
            Peg::B => &self.b,
            Peg::C => &self.c,
        }
    }

    /// Size ranks on `peg`, bottom to top.
    pub fn ranks(&self, peg: Peg) -> Vec<u32> {
        self.peg(peg).iter().map(Disk::rank).collect()
    }

    /// Total number of disks across all pegs.
    pub fn disk_count(&self) -> usize {
        Peg::ALL
            .iter()
            .fold(0_usize, |acc, peg| acc.saturating_add(self.peg(*peg).len()))
    }

    /// Return `true` if no peg holds a disk.
    pub fn is_empty(&self) -> bool {
        self.a.is_empty() && self.b.is_empty() && self.c.is_empty()
    }
}
