//! State shared between an export worker and its observers.

use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::{Condvar, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::domain::{SessionSnapshot, SessionState};

#[derive(Debug, Default)]
struct Outcome {
    finished_at: Option<DateTime<Utc>>,
    error: Option<String>,
}

/// Control block of one export session.
///
/// Pause and resume change the state while holding the gate lock, and the
/// worker re-checks the state under the same lock before waiting, so a resume
/// or cancel can never slip between the check and the wait.
#[derive(Debug)]
pub struct SessionControl {
    id: Uuid,
    requested: u64,
    output: String,
    started_at: DateTime<Utc>,
    state: AtomicU8,
    produced: AtomicU64,
    cancel: CancellationToken,
    gate: Mutex<()>,
    wake: Condvar,
    outcome: Mutex<Outcome>,
}

impl SessionControl {
    /// Create an idle control block.
    #[must_use]
    pub fn new(requested: u64, output: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            requested,
            output: output.into(),
            started_at: Utc::now(),
            state: AtomicU8::new(SessionState::Idle.as_u8()),
            produced: AtomicU64::new(0),
            cancel: CancellationToken::new(),
            gate: Mutex::new(()),
            wake: Condvar::new(),
            outcome: Mutex::new(Outcome::default()),
        }
    }

    /// Session identifier.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Requested count.
    #[must_use]
    pub const fn requested(&self) -> u64 {
        self.requested
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Numbers produced as of the last publish.
    #[must_use]
    pub fn produced(&self) -> u64 {
        self.produced.load(Ordering::Acquire)
    }

    /// `produced / requested`, in `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f64 {
        if self.requested == 0 {
            return 0.0;
        }
        (self.produced() as f64 / self.requested as f64).min(1.0)
    }

    /// `Idle -> Running`.
    pub fn mark_running(&self) -> bool {
        self.transition(SessionState::Idle, SessionState::Running)
    }

    /// `Running -> Paused`. Returns `false` from any other state.
    pub fn pause(&self) -> bool {
        let _gate = self.gate.lock();
        self.transition(SessionState::Running, SessionState::Paused)
    }

    /// `Paused -> Running`. Returns `false` from any other state.
    pub fn resume(&self) -> bool {
        let _gate = self.gate.lock();
        let resumed = self.transition(SessionState::Paused, SessionState::Running);
        if resumed {
            self.wake.notify_all();
        }
        resumed
    }

    /// Request cancellation and wake a paused worker.
    ///
    /// Returns `false` if the session already finished or was cancelled.
    pub fn cancel(&self) -> bool {
        if self.state().is_terminal() || self.cancel.is_cancelled() {
            return false;
        }
        self.cancel.cancel();
        let _gate = self.gate.lock();
        self.wake.notify_all();
        true
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Block while paused.
    ///
    /// Returns when resumed or cancelled. `poll` bounds each wait.
    pub fn wait_while_paused(&self, poll: Duration) {
        let mut gate = self.gate.lock();
        self.hold_while_paused(&mut gate, poll);
    }

    /// Publish the produced count.
    ///
    /// The store happens under the pause gate and waits out a pause, so the
    /// count observers see never moves between `pause` and `resume`.
    pub fn publish_produced(&self, produced: u64, poll: Duration) {
        let mut gate = self.gate.lock();
        self.hold_while_paused(&mut gate, poll);
        self.produced.store(produced, Ordering::Release);
    }

    fn hold_while_paused(&self, gate: &mut MutexGuard<'_, ()>, poll: Duration) {
        while self.state() == SessionState::Paused && !self.cancel.is_cancelled() {
            self.wake.wait_for(gate, poll);
        }
    }

    /// Record the terminal state.
    pub fn finish(&self, state: SessionState, error: Option<String>) {
        {
            let mut outcome = self.outcome.lock();
            outcome.finished_at = Some(Utc::now());
            outcome.error = error;
        }
        let _gate = self.gate.lock();
        self.state.store(state.as_u8(), Ordering::Release);
        self.wake.notify_all();
    }

    /// Consistent view for observers.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let (finished_at, error) = {
            let outcome = self.outcome.lock();
            (outcome.finished_at, outcome.error.clone())
        };

        SessionSnapshot {
            id: self.id,
            state: self.state(),
            progress: self.progress(),
            requested: self.requested,
            produced: self.produced(),
            output: self.output.clone(),
            started_at: self.started_at,
            finished_at,
            error,
        }
    }

    fn transition(&self, from: SessionState, to: SessionState) -> bool {
        self.state
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    use super::*;

    const POLL: Duration = Duration::from_millis(10);

    fn running(requested: u64) -> SessionControl {
        let control = SessionControl::new(requested, "memory");
        assert!(control.mark_running());
        control
    }

    #[test]
    fn test_pause_resume_transitions() {
        let control = running(10);

        assert!(control.pause());
        assert!(!control.pause());
        assert_eq!(control.state(), SessionState::Paused);

        assert!(control.resume());
        assert!(!control.resume());
        assert_eq!(control.state(), SessionState::Running);
    }

    #[test]
    fn test_idle_cannot_pause() {
        let control = SessionControl::new(10, "memory");
        assert!(!control.pause());
        assert!(!control.resume());
    }

    #[test]
    fn test_terminal_state_is_final() {
        let control = running(10);
        control.finish(SessionState::Completed, None);

        assert!(!control.pause());
        assert!(!control.resume());
        assert!(!control.cancel());
        assert!(!control.mark_running());
        assert_eq!(control.state(), SessionState::Completed);
        assert!(control.snapshot().finished_at.is_some());
    }

    #[test]
    fn test_progress() {
        let control = running(4);
        assert!(control.progress().abs() < f64::EPSILON);
        control.publish_produced(1, POLL);
        assert!((control.progress() - 0.25).abs() < f64::EPSILON);
        control.publish_produced(4, POLL);
        assert!((control.progress() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resume_wakes_waiter() {
        let control = Arc::new(running(10));
        assert!(control.pause());

        let waiter = {
            let control = Arc::clone(&control);
            thread::spawn(move || {
                let start = Instant::now();
                control.wait_while_paused(Duration::from_secs(30));
                start.elapsed()
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(control.resume());
        let waited = waiter.join().unwrap();
        assert!(waited < Duration::from_secs(10));
    }

    #[test]
    fn test_publish_waits_out_pause() {
        let control = Arc::new(running(10));
        control.publish_produced(2, POLL);
        assert!(control.pause());

        let publisher = {
            let control = Arc::clone(&control);
            thread::spawn(move || control.publish_produced(5, Duration::from_secs(30)))
        };

        thread::sleep(Duration::from_millis(50));
        assert_eq!(control.snapshot().produced, 2);
        assert!(control.resume());
        publisher.join().unwrap();
        assert_eq!(control.snapshot().produced, 5);
    }

    #[test]
    fn test_cancel_wakes_paused_waiter() {
        let control = Arc::new(running(10));
        assert!(control.pause());

        let waiter = {
            let control = Arc::clone(&control);
            thread::spawn(move || control.wait_while_paused(Duration::from_secs(30)))
        };

        thread::sleep(Duration::from_millis(50));
        assert!(control.cancel());
        waiter.join().unwrap();
        assert!(control.is_cancelled());
        assert!(!control.cancel());
    }

    #[test]
    fn test_snapshot_carries_error() {
        let control = running(10);
        control.publish_produced(3, POLL);
        control.finish(SessionState::Failed, Some("disk full".to_string()));

        let snapshot = control.snapshot();
        assert_eq!(snapshot.state, SessionState::Failed);
        assert_eq!(snapshot.produced, 3);
        assert_eq!(snapshot.output, "memory");
        assert_eq!(snapshot.error.as_deref(), Some("disk full"));
    }
}
