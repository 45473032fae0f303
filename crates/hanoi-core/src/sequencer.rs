//! The playback state machine.
//!
//! A [`Sequencer`] moves through `Idle -> Running -> (Finished | Cancelled
//! | Faulted)`. A new [`start`](Sequencer::start) is accepted from `Idle`
//! or any terminal phase and rejected while `Running`; at most one session
//! is active per sequencer. Independent sequencers share no state and may
//! run side by side.
//!
//! # Architecture
//!
//! `start` spawns [`player::play`] as a tokio task and hands back a
//! [`PlaybackHandle`]. The task reports through an internal observer that
//!
//! - delivers every event to every subscriber over its own bounded
//!   [`mpsc`] queue, waiting for room instead of dropping events,
//! - publishes the latest snapshot on a [`watch`] channel, so
//!   [`current_snapshot`](Sequencer::current_snapshot) never blocks the
//!   player,
//! - stores the terminal phase and enqueues the terminal event under the
//!   session lock, so a subscriber that sees `SequenceFinished` can start
//!   again at once and never sees an event of the old session afterwards.
//!
//! The phase is an atomic. Session bookkeeping sits behind a short-lived
//! mutex so `start`, `cancel`, and `reset` always agree on which session
//! is current. If the playback task is dropped before it reports a
//! terminal event (runtime shutdown, abort), a guard moves the phase to
//! `Cancelled` so the sequencer never stays stuck in `Running`.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use hanoi_board::Board;
use hanoi_types::{BoardSnapshot, MoveSequence, PlaybackEvent, SessionId};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, trace, warn};

use crate::config::PlaybackConfig;
use crate::control::PlaybackControl;
use crate::player::{self, PlaybackError, PlaybackObserver, PlaybackReport};

/// Default per-subscriber event buffer.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Errors returned by sequencer operations.
#[derive(Debug, thiserror::Error)]
pub enum SequencerError {
    /// `start` or `reset` was called while a session is running.
    #[error("sequencer is already running")]
    AlreadyRunning,

    /// `cancel` was called while no session is running.
    #[error("sequencer is not running")]
    NotRunning,

    /// `start` was called outside a tokio runtime.
    #[error("no tokio runtime available to drive playback")]
    NoRuntime,

    /// Playback halted on an internal consistency failure.
    #[error("playback error: {source}")]
    Playback {
        /// The underlying playback error.
        #[from]
        source: PlaybackError,
    },

    /// The playback task ended without producing a result.
    #[error("playback task failed: {message}")]
    TaskFailed {
        /// Description of the task failure.
        message: String,
    },
}

/// Lifecycle phase of a [`Sequencer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequencerPhase {
    /// No session has started since creation or the last reset.
    Idle,
    /// A session is playing moves.
    Running,
    /// The last session applied every move.
    Finished,
    /// The last session stopped early on request, or its task was dropped.
    Cancelled,
    /// The last session halted because the board rejected a move.
    Faulted,
}

impl SequencerPhase {
    const fn to_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Running => 1,
            Self::Finished => 2,
            Self::Cancelled => 3,
            Self::Faulted => 4,
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Running,
            2 => Self::Finished,
            3 => Self::Cancelled,
            4 => Self::Faulted,
            _ => Self::Idle,
        }
    }

    /// Return `true` for `Finished`, `Cancelled`, and `Faulted`.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled | Self::Faulted)
    }

    /// Phase a terminal event moves the sequencer into.
    const fn after(event: &PlaybackEvent) -> Option<Self> {
        match event {
            PlaybackEvent::SequenceFinished { .. } => Some(Self::Finished),
            PlaybackEvent::SequenceCancelled { .. } => Some(Self::Cancelled),
            PlaybackEvent::SequenceFaulted { .. } => Some(Self::Faulted),
            PlaybackEvent::MoveStarted { .. } | PlaybackEvent::MoveCompleted { .. } => None,
        }
    }
}

/// JSON-serializable status of a sequencer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackStatus {
    /// Current lifecycle phase.
    pub phase: SequencerPhase,
    /// The current or most recent session, if any.
    pub session_id: Option<SessionId>,
    /// Moves committed in that session.
    pub moves_completed: u64,
    /// Moves in that session's sequence.
    pub total_moves: u64,
    /// Per-move wait in milliseconds.
    pub step_duration_ms: u64,
    /// Elapsed wall-clock seconds since the session started.
    pub elapsed_seconds: u64,
    /// ISO 8601 timestamp of when the session started.
    pub started_at: Option<String>,
}

/// State shared between the sequencer handle and its playback task.
#[derive(Debug)]
struct Shared {
    /// Encoded [`SequencerPhase`].
    phase: AtomicU8,
    /// Control state of the current or most recent session.
    session: Mutex<Option<Arc<PlaybackControl>>>,
    /// One bounded queue per live subscriber.
    subscribers: Mutex<Vec<mpsc::Sender<PlaybackEvent>>>,
    /// Buffer size of each subscriber queue.
    event_capacity: usize,
    /// Latest board snapshot.
    snapshot: watch::Sender<BoardSnapshot>,
}

impl Shared {
    fn phase(&self) -> SequencerPhase {
        SequencerPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    fn set_phase(&self, phase: SequencerPhase) {
        self.phase.store(phase.to_u8(), Ordering::Release);
    }

    fn lock_session(&self) -> MutexGuard<'_, Option<Arc<PlaybackControl>>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, Vec<mpsc::Sender<PlaybackEvent>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Clone the live subscriber senders so delivery can await without
    /// holding the lock.
    fn live_subscribers(&self) -> Vec<mpsc::Sender<PlaybackEvent>> {
        let mut subscribers = self.lock_subscribers();
        subscribers.retain(|tx| !tx.is_closed());
        subscribers.clone()
    }
}

/// Drives timed, cancellable playback of a move sequence against a board.
///
/// Cloning a `Sequencer` yields another handle to the same state machine,
/// which is how a UI or signal handler cancels a session started elsewhere.
#[derive(Debug, Clone)]
pub struct Sequencer {
    shared: Arc<Shared>,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl Sequencer {
    /// Create an idle sequencer whose subscribers each buffer up to
    /// `event_capacity` events (at least 1).
    pub fn new(event_capacity: usize) -> Self {
        let (snapshot, _) = watch::channel(BoardSnapshot::default());
        Self {
            shared: Arc::new(Shared {
                phase: AtomicU8::new(SequencerPhase::Idle.to_u8()),
                session: Mutex::new(None),
                subscribers: Mutex::new(Vec::new()),
                event_capacity: event_capacity.max(1),
                snapshot,
            }),
        }
    }

    /// Create an idle sequencer sized from configuration.
    pub fn from_config(config: &PlaybackConfig) -> Self {
        Self::new(config.event_capacity)
    }

    /// Return the current lifecycle phase.
    pub fn phase(&self) -> SequencerPhase {
        self.shared.phase()
    }

    /// Subscribe to playback events.
    ///
    /// Only events published after subscribing are received, so subscribe
    /// before calling [`start`](Self::start). No event is ever dropped:
    /// when a subscriber's buffer is full the player waits for it to
    /// drain. A subscriber that stops reading must drop its receiver, or
    /// playback stalls once the buffer fills.
    pub fn subscribe(&self) -> mpsc::Receiver<PlaybackEvent> {
        let (tx, rx) = mpsc::channel(self.shared.event_capacity);
        let mut subscribers = self.shared.lock_subscribers();
        subscribers.retain(|tx| !tx.is_closed());
        subscribers.push(tx);
        rx
    }

    /// Watch the latest board snapshot.
    pub fn watch_snapshot(&self) -> watch::Receiver<BoardSnapshot> {
        self.shared.snapshot.subscribe()
    }

    /// Return the latest board snapshot.
    ///
    /// Before the first `start` (or after a reset) this is an empty board.
    pub fn current_snapshot(&self) -> BoardSnapshot {
        self.shared.snapshot.borrow().clone()
    }

    /// Start playing `moves` against `board`.
    ///
    /// The caller initializes the board; the sequencer only walks the
    /// pre-generated moves against it. The board is owned by the playback
    /// task until the session ends and comes back in the
    /// [`PlaybackReport`].
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::AlreadyRunning`] if a session is running
    /// (nothing changes), or [`SequencerError::NoRuntime`] if called
    /// outside a tokio runtime.
    pub fn start(
        &self,
        board: Board,
        moves: MoveSequence,
        step_duration: Duration,
    ) -> Result<PlaybackHandle, SequencerError> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_err| SequencerError::NoRuntime)?;

        let mut session = self.shared.lock_session();
        self.claim_running()?;

        let control = Arc::new(PlaybackControl::new(step_duration, moves.len()));
        *session = Some(Arc::clone(&control));
        drop(session);

        self.shared.snapshot.send_replace(board.snapshot());

        let session_id = control.session_id();
        info!(
            %session_id,
            total_moves = moves.len(),
            step_duration = ?step_duration,
            "Sequencer started"
        );

        let mut observer = ChannelObserver {
            shared: Arc::clone(&self.shared),
        };
        // Built outside the task so it is dropped even if the task is
        // never polled.
        let guard = SessionGuard {
            shared: Arc::clone(&self.shared),
            control: Arc::clone(&control),
        };
        let join = runtime.spawn(async move {
            let _guard = guard;
            player::play(board, &moves, &control, &mut observer)
                .await
                .map_err(SequencerError::from)
        });

        Ok(PlaybackHandle { session_id, join })
    }

    /// Request cancellation of the running session.
    ///
    /// The session stops at the next move boundary, after any in-flight
    /// move has committed, and emits `SequenceCancelled`. A request that
    /// arrives during the wait after the final move ends the session as
    /// `SequenceFinished` instead, since every move has been applied.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::NotRunning`] if no session is running.
    pub fn cancel(&self) -> Result<(), SequencerError> {
        let session = self.shared.lock_session();
        match (self.phase(), session.as_ref()) {
            (SequencerPhase::Running, Some(control)) => {
                info!(session_id = %control.session_id(), "Cancellation requested");
                control.request_cancel();
                Ok(())
            }
            (phase, _) => {
                warn!(?phase, "Cancel rejected: sequencer is not running");
                Err(SequencerError::NotRunning)
            }
        }
    }

    /// Change the per-move wait of the running session.
    ///
    /// The new value governs the next wait; a wait already in progress is
    /// not shortened or extended. Returns the previous duration, or `None`
    /// if no session is running.
    pub fn set_step_duration(&self, step_duration: Duration) -> Option<Duration> {
        let session = self.shared.lock_session();
        if self.phase() != SequencerPhase::Running {
            return None;
        }
        let prev = session
            .as_ref()
            .map(|control| control.set_step_duration(step_duration));
        info!(?prev, new = ?step_duration, "Step duration changed");
        prev
    }

    /// Return to `Idle` from a terminal phase and clear the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::AlreadyRunning`] if a session is running.
    pub fn reset(&self) -> Result<(), SequencerError> {
        let mut session = self.shared.lock_session();
        if self.phase() == SequencerPhase::Running {
            warn!("Reset rejected: sequencer is running");
            return Err(SequencerError::AlreadyRunning);
        }
        *session = None;
        self.shared.set_phase(SequencerPhase::Idle);
        self.shared.snapshot.send_replace(BoardSnapshot::default());
        info!("Sequencer reset");
        Ok(())
    }

    /// Return a serializable status summary.
    pub fn status(&self) -> PlaybackStatus {
        let session = self.shared.lock_session();
        let phase = self.phase();
        match session.as_ref() {
            Some(control) => PlaybackStatus {
                phase,
                session_id: Some(control.session_id()),
                moves_completed: control.moves_completed(),
                total_moves: control.total_moves(),
                step_duration_ms: u64::try_from(control.step_duration().as_millis())
                    .unwrap_or(u64::MAX),
                elapsed_seconds: control.elapsed_seconds(),
                started_at: Some(control.started_at().to_rfc3339()),
            },
            None => PlaybackStatus {
                phase,
                session_id: None,
                moves_completed: 0,
                total_moves: 0,
                step_duration_ms: 0,
                elapsed_seconds: 0,
                started_at: None,
            },
        }
    }

    /// Atomically move from any non-running phase to `Running`.
    fn claim_running(&self) -> Result<(), SequencerError> {
        let running = SequencerPhase::Running.to_u8();
        self.shared
            .phase
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current != running).then_some(running)
            })
            .map(|_prev| ())
            .map_err(|_current| {
                warn!("Start rejected: sequencer is already running");
                SequencerError::AlreadyRunning
            })
    }
}

/// Handle to a spawned playback session.
#[derive(Debug)]
pub struct PlaybackHandle {
    session_id: SessionId,
    join: JoinHandle<Result<PlaybackReport, SequencerError>>,
}

impl PlaybackHandle {
    /// Return the session identifier.
    pub const fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Return `true` once the playback task has ended.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the session to end.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::Playback`] if the board rejected a move,
    /// or [`SequencerError::TaskFailed`] if the task itself died. In the
    /// latter case the sequencer has already left `Running`.
    pub async fn finished(self) -> Result<PlaybackReport, SequencerError> {
        match self.join.await {
            Ok(result) => result,
            Err(e) => Err(SequencerError::TaskFailed {
                message: e.to_string(),
            }),
        }
    }
}

/// Bridges the player loop to the sequencer's phase and channels.
struct ChannelObserver {
    shared: Arc<Shared>,
}

impl PlaybackObserver for ChannelObserver {
    async fn on_event(&mut self, event: &PlaybackEvent) {
        let subscribers = self.shared.live_subscribers();

        // Wait for room in every queue first; the send itself cannot fail
        // or block once a permit is held.
        let mut permits = Vec::with_capacity(subscribers.len());
        for tx in &subscribers {
            if let Ok(permit) = tx.reserve().await {
                permits.push(permit);
            }
        }
        let receivers = permits.len();

        // The session lock keeps `start` from slipping in between the
        // terminal phase store and the terminal event.
        let session = self.shared.lock_session();
        if let PlaybackEvent::MoveCompleted { snapshot, .. } = event {
            self.shared.snapshot.send_replace(snapshot.clone());
        }
        if let Some(phase) = SequencerPhase::after(event) {
            self.shared.set_phase(phase);
        }
        for permit in permits {
            permit.send(event.clone());
        }
        drop(session);

        trace!(receivers, terminal = event.is_terminal(), "Event published");
    }
}

/// Moves an abandoned session out of `Running`.
///
/// Dropped with the playback task. A session that already published its
/// terminal event, or was superseded, is left alone.
struct SessionGuard {
    shared: Arc<Shared>,
    control: Arc<PlaybackControl>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let session = self.shared.lock_session();
        let current = session
            .as_ref()
            .is_some_and(|control| Arc::ptr_eq(control, &self.control));
        if !current || self.shared.phase() != SequencerPhase::Running {
            return;
        }

        let last_completed_index = usize::try_from(self.control.moves_completed())
            .ok()
            .and_then(|done| done.checked_sub(1));
        warn!(
            session_id = %self.control.session_id(),
            ?last_completed_index,
            "Playback task dropped before finishing"
        );
        self.shared.set_phase(SequencerPhase::Cancelled);

        // Best effort: nothing can be awaited here.
        let event = PlaybackEvent::SequenceCancelled {
            last_completed_index,
        };
        let subscribers = self.shared.lock_subscribers();
        for tx in subscribers.iter().filter(|tx| !tx.is_closed()) {
            if tx.try_send(event.clone()).is_err() {
                warn!("Subscriber missed the cancellation of a dropped session");
            }
        }
        drop(subscribers);
        drop(session);
    }
}
