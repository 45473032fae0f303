//! Partition and legality verification for board states.
//!
//! The board preserves both invariants by construction. These checks run
//! against a [`BoardSnapshot`] so they can validate a live board, a
//! snapshot received by a presentation layer, or a hand-built state in a
//! test:
//!
//! - **Partition**: every rank `1..=N` appears on exactly one peg exactly
//!   once, and nothing else does.
//! - **Legality**: on every peg, ranks strictly decrease from bottom to top.

use hanoi_types::{BoardSnapshot, Disk, Peg};

/// A single invariant violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The multiset of ranks on the board is not exactly `1..=N`.
    Partition {
        /// Number of disks the board should hold.
        expected: u32,
        /// All ranks found on the board, sorted ascending.
        found: Vec<u32>,
    },
    /// A disk rests on a disk that is not larger than itself.
    Legality {
        /// Peg where the violation sits.
        peg: Peg,
        /// Rank of the lower disk.
        below: u32,
        /// Rank of the disk resting on it.
        above: u32,
    },
}

/// The result of an invariant check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantResult {
    /// Both invariants hold.
    Holds,
    /// One or more invariants are broken.
    Violated(Vec<InvariantViolation>),
}

impl InvariantResult {
    /// Return `true` if both invariants hold.
    pub const fn holds(&self) -> bool {
        matches!(self, Self::Holds)
    }
}

/// Verify both invariants for a snapshot that should hold `disk_count`
/// disks.
pub fn verify_snapshot(snapshot: &BoardSnapshot, disk_count: u32) -> InvariantResult {
    let mut violations = Vec::new();

    if let Some(violation) = check_partition(snapshot, disk_count) {
        violations.push(violation);
    }
    for peg in Peg::ALL {
        violations.extend(check_legality(peg, snapshot.peg(peg)));
    }

    if violations.is_empty() {
        InvariantResult::Holds
    } else {
        InvariantResult::Violated(violations)
    }
}

/// Check that the ranks on the board are exactly `1..=disk_count`.
fn check_partition(snapshot: &BoardSnapshot, disk_count: u32) -> Option<InvariantViolation> {
    let mut found: Vec<u32> = Peg::ALL
        .iter()
        .flat_map(|peg| snapshot.peg(*peg).iter().map(Disk::rank))
        .collect();
    found.sort_unstable();

    if found.iter().copied().eq(1..=disk_count) {
        None
    } else {
        Some(InvariantViolation::Partition {
            expected: disk_count,
            found,
        })
    }
}

/// Report every adjacent pair on `stack` where the upper disk is not
/// strictly smaller than the one below it.
fn check_legality(peg: Peg, stack: &[Disk]) -> Vec<InvariantViolation> {
    stack
        .iter()
        .zip(stack.iter().skip(1))
        .filter(|(below, above)| below.rank() <= above.rank())
        .map(|(below, above)| InvariantViolation::Legality {
            peg,
            below: below.rank(),
            above: above.rank(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disks(ranks: &[u32]) -> Vec<Disk> {
        ranks.iter().copied().map(Disk::new).collect()
    }

    #[test]
    fn empty_board_with_zero_disks_holds() {
        assert_eq!(
            verify_snapshot(&BoardSnapshot::default(), 0),
            InvariantResult::Holds
        );
    }

    #[test]
    fn spread_legal_board_holds() {
        let snap = BoardSnapshot {
            a: disks(&[5, 2]),
            b: disks(&[4, 3, 1]),
            c: Vec::new(),
        };
        assert!(verify_snapshot(&snap, 5).holds());
    }

    #[test]
    fn missing_disk_breaks_partition() {
        let snap = BoardSnapshot {
            a: disks(&[3, 1]),
            b: Vec::new(),
            c: Vec::new(),
        };
        assert_eq!(
            verify_snapshot(&snap, 3),
            InvariantResult::Violated(vec![InvariantViolation::Partition {
                expected: 3,
                found: vec![1, 3],
            }])
        );
    }

    #[test]
    fn duplicated_rank_breaks_partition() {
        let snap = BoardSnapshot {
            a: disks(&[2, 1]),
            b: disks(&[1]),
            c: Vec::new(),
        };
        assert!(matches!(
            verify_snapshot(&snap, 2),
            InvariantResult::Violated(ref v) if matches!(v.first(), Some(InvariantViolation::Partition { .. }))
        ));
    }

    #[test]
    fn larger_on_smaller_breaks_legality() {
        let snap = BoardSnapshot {
            a: disks(&[1, 2]),
            b: Vec::new(),
            c: disks(&[3]),
        };
        assert_eq!(
            verify_snapshot(&snap, 3),
            InvariantResult::Violated(vec![InvariantViolation::Legality {
                peg: Peg::A,
                below: 1,
                above: 2,
            }])
        );
    }
}
