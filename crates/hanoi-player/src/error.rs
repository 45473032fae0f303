//! Error types for the player binary.
//!
//! [`HostError`] wraps every failure mode during startup and playback so
//! `main` can propagate with `?`.

/// Top-level error for the player binary.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: hanoi_core::config::ConfigError,
    },

    /// The solver rejected the puzzle.
    #[error("solver error: {source}")]
    Solver {
        /// The underlying solver error.
        #[from]
        source: hanoi_core::solver::SolverError,
    },

    /// Board initialization failed.
    #[error("board error: {source}")]
    Board {
        /// The underlying board error.
        #[from]
        source: hanoi_board::BoardError,
    },

    /// Starting or running the sequencer failed.
    #[error("sequencer error: {source}")]
    Sequencer {
        /// The underlying sequencer error.
        #[from]
        source: hanoi_core::sequencer::SequencerError,
    },
}
