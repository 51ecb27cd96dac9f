//! Cancellable progress tasks for long-running UI actions (report
//! generation, exports). The tracker is synchronous; `ProgressTask` drives it
//! from a tokio interval.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub const DEFAULT_STEP: u8 = 10;
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProgressState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

impl ProgressState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressTracker {
    step: u8,
    percent: u8,
    state: ProgressState,
}

impl ProgressTracker {
    pub fn new(step: u8) -> Self {
        Self {
            step: step.clamp(1, 100),
            percent: 0,
            state: ProgressState::Idle,
        }
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn state(&self) -> ProgressState {
        self.state
    }

    /// Restarts from zero unless already running.
    pub fn start(&mut self) {
        if self.state != ProgressState::Running {
            self.percent = 0;
            self.state = ProgressState::Running;
        }
    }

    /// Advances one step; reaching 100 completes. No-op unless running.
    pub fn tick(&mut self) -> u8 {
        if self.state == ProgressState::Running {
            self.percent = self.percent.saturating_add(self.step).min(100);
            if self.percent == 100 {
                self.state = ProgressState::Completed;
            }
        }
        self.percent
    }

    /// Stops a running tracker; completed trackers stay completed.
    pub fn cancel(&mut self) {
        if !self.state.is_terminal() {
            self.state = ProgressState::Cancelled;
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(DEFAULT_STEP)
    }
}

/// A tracker ticking on a fixed interval in a background task.
pub struct ProgressTask {
    token: CancellationToken,
    progress: watch::Receiver<u8>,
    handle: JoinHandle<ProgressState>,
}

impl ProgressTask {
    /// Must be called from within a tokio runtime. A zero interval is rejected.
    pub fn spawn(label: &str, step: u8, interval: Duration) -> CoreResult<Self> {
        if interval.is_zero() {
            return Err(CoreError::InvalidInput(format!(
                "progress task {} needs a non-zero tick interval",
                label
            )));
        }
        let token = CancellationToken::new();
        let (tx, rx) = watch::channel(0u8);
        let task_token = token.clone();
        let label = label.to_string();
        let handle = tokio::spawn(async move {
            let mut tracker = ProgressTracker::new(step);
            tracker.start();
            let mut ticker = tokio::time::interval(interval);
            // The first tick of a tokio interval fires immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if task_token.is_cancelled() {
                    tracker.cancel();
                    break;
                }
                let pct = tracker.tick();
                let _ = tx.send(pct);
                if tracker.state().is_terminal() {
                    break;
                }
            }
            info!(task = %label, percent = tracker.percent(), state = ?tracker.state(), "progress task finished");
            tracker.state()
        });
        Ok(Self {
            token,
            progress: rx,
            handle,
        })
    }

    pub fn spawn_default(label: &str) -> CoreResult<Self> {
        Self::spawn(label, DEFAULT_STEP, DEFAULT_INTERVAL)
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn progress(&self) -> u8 {
        *self.progress.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u8> {
        self.progress.clone()
    }

    /// Waits for the task to stop; a panicked or aborted task reports `Cancelled`.
    pub async fn wait(self) -> ProgressState {
        match self.handle.await {
            Ok(state) => state,
            Err(err) => {
                warn!(error = %err, "progress task aborted");
                ProgressState::Cancelled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_completes_at_one_hundred() {
        let mut t = ProgressTracker::new(30);
        assert_eq!(t.tick(), 0);
        t.start();
        assert_eq!(t.tick(), 30);
        t.tick();
        t.tick();
        assert_eq!(t.tick(), 100);
        assert_eq!(t.state(), ProgressState::Completed);
        assert_eq!(t.tick(), 100);
    }

    #[test]
    fn cancel_freezes_progress() {
        let mut t = ProgressTracker::default();
        t.start();
        t.tick();
        t.cancel();
        assert_eq!(t.tick(), 10);
        assert_eq!(t.state(), ProgressState::Cancelled);
        t.start();
        assert_eq!(t.percent(), 0);
        assert_eq!(t.state(), ProgressState::Running);
    }

    #[test]
    fn completed_tracker_ignores_cancel() {
        let mut t = ProgressTracker::new(100);
        t.start();
        t.tick();
        t.cancel();
        assert_eq!(t.state(), ProgressState::Completed);
    }
}
