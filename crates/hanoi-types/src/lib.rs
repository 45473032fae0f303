//! Shared type definitions for the Tower of Hanoi solver and player.
//!
//! This crate is the single source of truth for the data model shared by
//! the board, the solver, the sequencer, and any presentation layer.
//! Types flow downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for disk and session identifiers
//! - [`enums`] -- The fixed [`Peg`] set
//! - [`structs`] -- Disks, moves, move sequences, and board snapshots
//! - [`events`] -- Playback events consumed by presentation layers

pub mod enums;
pub mod events;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::Peg;
pub use events::PlaybackEvent;
pub use ids::{DiskId, SessionId};
pub use structs::{BoardSnapshot, Disk, Move, MoveSequence};

#[cfg(test)]
mod tests {
    //! Binding generation for the presentation layer.

    #[test]
    fn export_bindings() {
        // Writes TypeScript definitions to `bindings/` relative to the
        // crate root.
        use ts_rs::TS;

        let _ = crate::ids::DiskId::export_all();
        let _ = crate::ids::SessionId::export_all();
        let _ = crate::enums::Peg::export_all();
        let _ = crate::structs::Disk::export_all();
        let _ = crate::structs::Move::export_all();
        let _ = crate::structs::MoveSequence::export_all();
        let _ = crate::structs::BoardSnapshot::export_all();
        let _ = crate::events::PlaybackEvent::export_all();
    }
}
