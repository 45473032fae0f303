//! Player binary for the Tower of Hanoi.
//!
//! A thin host around `hanoi-core`: it loads configuration, solves the
//! puzzle, plays the solution back at the configured tempo, and logs every
//! playback event. Ctrl-C cancels playback at the next move boundary.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `hanoi-config.yaml` (or `$HANOI_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Solve the puzzle
//! 4. Initialize the board
//! 5. Start the sequencer and the event logger
//! 6. Wire Ctrl-C to cancellation
//! 7. Wait for playback to end and log the result

mod error;
mod event_log;

use std::path::PathBuf;

use hanoi_board::Board;
use hanoi_core::config::{HanoiConfig, LogFormat, LoggingConfig};
use hanoi_core::player;
use hanoi_core::sequencer::Sequencer;
use hanoi_core::solver;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::HostError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "hanoi-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, solving, or playback fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, config_path) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("hanoi-player starting");
    match &config_path {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }

    let puzzle = &config.puzzle;
    info!(
        disk_count = puzzle.disk_count,
        source = %puzzle.source,
        destination = %puzzle.destination,
        auxiliary = %puzzle.auxiliary,
        step_duration_ms = config.playback.step_duration_ms,
        "Puzzle configured"
    );

    // 3. Solve.
    let moves = solver::solve(
        puzzle.disk_count,
        puzzle.source,
        puzzle.destination,
        puzzle.auxiliary,
    )
    .map_err(HostError::from)?;
    info!(moves = moves.len(), "Solution computed");

    // 4. Initialize the board.
    let board = Board::with_disks(puzzle.disk_count, puzzle.source).map_err(HostError::from)?;

    // 5. Start playback and the event logger.
    let sequencer = Sequencer::from_config(&config.playback);
    let log_task = tokio::spawn(event_log::log_events(sequencer.subscribe()));
    let handle = sequencer
        .start(board, moves, config.playback.step_duration())
        .map_err(HostError::from)?;

    // 6. Ctrl-C cancels at the next move boundary.
    let canceller = sequencer.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling playback");
            if let Err(e) = canceller.cancel() {
                warn!(error = %e, "Cancel ignored");
            }
        }
    });

    // 7. Wait for the result.
    let report = handle.finished().await.map_err(HostError::from)?;
    player::log_playback_end(&report);

    match log_task.await {
        Ok(logged) => info!(events = logged, "Event log drained"),
        Err(e) => warn!(error = %e, "Event log task failed"),
    }

    info!(
        outcome = ?report.outcome,
        solved = report.board.is_solved_on(puzzle.destination),
        "hanoi-player shutdown complete"
    );

    Ok(())
}

/// Load configuration from `$HANOI_CONFIG` or `hanoi-config.yaml`.
///
/// Returns the path that was read, or `None` if the file does not exist
/// and defaults are used.
fn load_config() -> Result<(HanoiConfig, Option<PathBuf>), HostError> {
    let config_path = std::env::var_os("HANOI_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if config_path.exists() {
        let config = HanoiConfig::from_file(&config_path)?;
        Ok((config, Some(config_path)))
    } else {
        Ok((HanoiConfig::default(), None))
    }
}

/// Install the global tracing subscriber.
///
/// `$HANOI_LOG` (`EnvFilter` syntax) overrides the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_env("HANOI_LOG").unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}
