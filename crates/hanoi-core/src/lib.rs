//! Solver, playback control, and move sequencer for the Tower of Hanoi.
//!
//! This crate owns the two subsystems that do real work: the recursive
//! move-sequence generator and the timed, cancellable sequencer that plays
//! a generated sequence against an authoritative board.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `hanoi-config.yaml` into
//!   strongly-typed structs.
//! - [`solver`] -- The classical divide-and-conquer solver.
//! - [`control`] -- Per-session playback control: tempo, cancellation,
//!   and progress counters shared between the player task and callers.
//! - [`player`] -- The async step loop and the [`PlaybackObserver`] trait.
//! - [`sequencer`] -- The [`Sequencer`] state machine that spawns playback
//!   and publishes events.
//!
//! [`PlaybackObserver`]: player::PlaybackObserver
//! [`Sequencer`]: sequencer::Sequencer

pub mod config;
pub mod control;
pub mod player;
pub mod sequencer;
pub mod solver;
