//! Enumeration types for the Tower of Hanoi model.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One of the three fixed pegs a disk can occupy.
///
/// Exactly three pegs exist for the lifetime of a puzzle. They are never
/// created or destroyed dynamically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Peg {
    /// The left peg (index 0).
    #[serde(alias = "a", alias = "0")]
    A,
    /// The middle peg (index 1).
    #[serde(alias = "b", alias = "1")]
    B,
    /// The right peg (index 2).
    #[serde(alias = "c", alias = "2")]
    C,
}

impl Peg {
    /// All pegs in index order.
    pub const ALL: [Self; 3] = [Self::A, Self::B, Self::C];

    /// Zero-based position of the peg (A = 0, B = 1, C = 2).
    pub const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
        }
    }

    /// Look up a peg by its zero-based position.
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::A),
            1 => Some(Self::B),
            2 => Some(Self::C),
            _ => None,
        }
    }

    /// Return `true` if the three pegs are pairwise distinct.
    pub fn all_distinct(a: Self, b: Self, c: Self) -> bool {
        a != b && b != c && a != c
    }
}

impl core::fmt::Display for Peg {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        };
        f.write_str(name)
    }
}
