//! Per-session playback control shared between the player task and callers.
//!
//! A [`PlaybackControl`] is created for every playback session and shared
//! via [`Arc`](std::sync::Arc) between the spawned player loop and the
//! [`Sequencer`](crate::sequencer::Sequencer) handle. Callers adjust the
//! tempo and request cancellation through it; the player reads both at
//! move boundaries and publishes its progress back.
//!
//! # Architecture
//!
//! All mutable fields are atomics so reads on the player's hot path never
//! take a lock. The inter-move wait races a timer against a [`Notify`], so
//! a cancellation request cuts the wait short without ever interrupting a
//! move in flight.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use hanoi_types::SessionId;
use tokio::sync::Notify;

/// Shared control state for one playback session.
#[derive(Debug)]
pub struct PlaybackControl {
    /// Identifier of the session this control belongs to.
    session_id: SessionId,

    /// Wait after each move, in milliseconds (runtime-adjustable).
    step_duration_ms: AtomicU64,

    /// Whether a cancellation has been requested.
    cancel_requested: AtomicBool,

    /// Wakes the player out of an inter-move wait on cancellation.
    cancel_notify: Notify,

    /// Number of moves committed to the board so far.
    moves_completed: AtomicU64,

    /// Number of moves in the session's sequence.
    total_moves: u64,

    /// Wall-clock time when the session started.
    started_at: DateTime<Utc>,
}

impl PlaybackControl {
    /// Create control state for a session of `total_moves` moves.
    pub fn new(step_duration: Duration, total_moves: usize) -> Self {
        Self {
            session_id: SessionId::new(),
            step_duration_ms: AtomicU64::new(duration_to_ms(step_duration)),
            cancel_requested: AtomicBool::new(false),
            cancel_notify: Notify::new(),
            moves_completed: AtomicU64::new(0),
            total_moves: u64::try_from(total_moves).unwrap_or(u64::MAX),
            started_at: Utc::now(),
        }
    }

    /// Return the session identifier.
    pub const fn session_id(&self) -> SessionId {
        self.session_id
    }

    // -----------------------------------------------------------------------
    // Tempo
    // -----------------------------------------------------------------------

    /// Get the current per-move wait.
    pub fn step_duration(&self) -> Duration {
        Duration::from_millis(self.step_duration_ms.load(Ordering::Acquire))
    }

    /// Set the per-move wait, returning the previous value.
    ///
    /// Takes effect at the next move boundary. A wait that has already
    /// started keeps the duration it started with. Sub-millisecond
    /// precision is dropped.
    pub fn set_step_duration(&self, step_duration: Duration) -> Duration {
        let prev = self
            .step_duration_ms
            .swap(duration_to_ms(step_duration), Ordering::AcqRel);
        Duration::from_millis(prev)
    }

    /// Wait out one step, or return early if cancellation is requested.
    ///
    /// The duration is read once when the wait begins. A zero duration
    /// still yields to the scheduler so other tasks, including a
    /// cancelling caller, get to run between moves.
    pub async fn wait_step(&self) {
        let step = self.step_duration();
        if self.is_cancel_requested() {
            return;
        }
        if step.is_zero() {
            tokio::task::yield_now().await;
            return;
        }
        tokio::select! {
            () = tokio::time::sleep(step) => {}
            () = self.cancel_notify.notified() => {}
        }
    }

    // -----------------------------------------------------------------------
    // Cancellation
    // -----------------------------------------------------------------------

    /// Request cancellation at the next move boundary.
    pub fn request_cancel(&self) {
        self.cancel_requested.store(true, Ordering::Release);
        self.cancel_notify.notify_one();
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::Acquire)
    }

    // -----------------------------------------------------------------------
    // Progress
    // -----------------------------------------------------------------------

    /// Record that one more move has been committed.
    pub fn record_move_completed(&self) {
        self.moves_completed.fetch_add(1, Ordering::AcqRel);
    }

    /// Number of moves committed so far.
    pub fn moves_completed(&self) -> u64 {
        self.moves_completed.load(Ordering::Acquire)
    }

    /// Number of moves in the session's sequence.
    pub const fn total_moves(&self) -> u64 {
        self.total_moves
    }

    /// Return the wall-clock start time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Return elapsed seconds since the session started.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        // `num_seconds` can be negative if clocks are weird; treat as 0.
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }
}

/// Convert a duration to whole milliseconds, saturating at `u64::MAX`.
fn duration_to_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use super::*;

    #[test]
    fn initial_state() {
        let control = PlaybackControl::new(Duration::from_millis(500), 7);
        assert_eq!(control.step_duration(), Duration::from_millis(500));
        assert!(!control.is_cancel_requested());
        assert_eq!(control.moves_completed(), 0);
        assert_eq!(control.total_moves(), 7);
    }

    #[test]
    fn set_step_duration_returns_previous() {
        let control = PlaybackControl::new(Duration::from_millis(500), 1);
        let prev = control.set_step_duration(Duration::from_millis(250));
        assert_eq!(prev, Duration::from_millis(500));
        assert_eq!(control.step_duration(), Duration::from_millis(250));
    }

    #[test]
    fn cancel_request_is_sticky() {
        let control = PlaybackControl::new(Duration::ZERO, 1);
        control.request_cancel();
        assert!(control.is_cancel_requested());
        control.request_cancel();
        assert!(control.is_cancel_requested());
    }

    #[test]
    fn progress_counts_up() {
        let control = PlaybackControl::new(Duration::ZERO, 3);
        control.record_move_completed();
        control.record_move_completed();
        assert_eq!(control.moves_completed(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_step_sleeps_for_duration() {
        let control = PlaybackControl::new(Duration::from_millis(300), 1);
        let begin = Instant::now();
        control.wait_step().await;
        let elapsed = begin.elapsed();
        assert!(elapsed >= Duration::from_millis(300), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(310), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_cuts_wait_short() {
        let control = std::sync::Arc::new(PlaybackControl::new(Duration::from_secs(60), 1));
        let waiter = std::sync::Arc::clone(&control);
        let begin = Instant::now();
        let task = tokio::spawn(async move { waiter.wait_step().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        control.request_cancel();
        task.await.ok();
        assert!(begin.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_does_not_advance_time() {
        let control = PlaybackControl::new(Duration::ZERO, 1);
        let begin = Instant::now();
        control.wait_step().await;
        assert_eq!(begin.elapsed(), Duration::ZERO);
    }
}
