//! Background task that pulls envelopes off a [`FrameTransport`] and hands
//! them to a [`MessageListener`].
//!
//! # Lifecycle
//!
//! ```text
//! Idle ──start()──▶ Running ──stop() / read failure──▶ Stopped
//!                      ▲                                  │
//!                      └───────────start()────────────────┘
//! ```
//!
//! `stop()` signals the task through a watch channel.  The task selects on
//! that signal and on the pending read, so a read parked on an idle stream is
//! dropped at its await point rather than left running.  The caller then
//! waits up to the grace period for the task to finish and aborts it if it
//! has not.
//!
//! Dropping a read mid-frame loses nothing: the transport keeps the bytes of
//! an unfinished frame, and the next `start()` resumes from them.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::transport::frame_transport::FrameTransport;
use crate::transport::MessageListener;

tokio::task_local! {
    /// Identity of the receive loop whose task is currently executing.
    static ACTIVE_LOOP: usize;
}

/// Observable state of a [`ReceiveLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Never started.
    Idle,
    Running,
    /// Stopped explicitly or after the first read failure.
    Stopped,
}

struct RunningTask {
    cancel: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Owns at most one background receive task.
pub struct ReceiveLoop {
    state: Arc<Mutex<LoopState>>,
    task: Mutex<Option<RunningTask>>,
    grace: Duration,
}

impl ReceiveLoop {
    /// Creates an idle loop.  `grace` bounds how long [`stop`](Self::stop)
    /// waits for the task to exit.
    pub fn new(grace: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(LoopState::Idle)),
            task: Mutex::new(None),
            grace,
        }
    }

    pub fn state(&self) -> LoopState {
        *lock(&self.state)
    }

    /// Spawns the receive task.  A loop that is already running is stopped
    /// first, so at most one task ever reads from the transport.
    pub async fn start(&self, transport: Arc<FrameTransport>, listener: Arc<dyn MessageListener>) {
        let has_task = lock(&self.task).is_some();
        if has_task {
            self.stop().await;
        }

        let (cancel, cancelled) = watch::channel(false);
        *lock(&self.state) = LoopState::Running;

        let state = Arc::clone(&self.state);
        let task = run(transport, listener, state, cancelled);
        let handle = tokio::spawn(ACTIVE_LOOP.scope(self.identity(), task));

        *lock(&self.task) = Some(RunningTask { cancel, handle });
    }

    /// Ends the receive task and leaves the loop in [`LoopState::Stopped`].
    ///
    /// Safe to call any number of times.  When called from inside the task
    /// itself (for example from a listener callback) it only signals, since
    /// waiting on its own task could never succeed.
    pub async fn stop(&self) {
        *lock(&self.state) = LoopState::Stopped;

        let task = lock(&self.task).take();
        let Some(RunningTask { cancel, mut handle }) = task else {
            return;
        };

        // Err only if the task already finished and dropped its receiver.
        let _ = cancel.send(true);

        if self.is_current_task() {
            debug!("receive loop stop requested from its own task");
            return;
        }

        match tokio::time::timeout(self.grace, &mut handle).await {
            Ok(Ok(())) => debug!("receive loop exited"),
            Ok(Err(e)) if e.is_cancelled() => debug!("receive loop cancelled"),
            Ok(Err(e)) => warn!(error = %e, "receive loop task failed"),
            Err(_) => {
                warn!(
                    grace_ms = self.grace.as_millis() as u64,
                    "receive loop did not exit within the grace period; aborting"
                );
                handle.abort();
            }
        }
    }

    fn identity(&self) -> usize {
        Arc::as_ptr(&self.state) as usize
    }

    fn is_current_task(&self) -> bool {
        ACTIVE_LOOP
            .try_with(|active| *active == self.identity())
            .unwrap_or(false)
    }
}

impl Drop for ReceiveLoop {
    fn drop(&mut self) {
        if let Some(task) = lock(&self.task).take() {
            task.handle.abort();
        }
    }
}

async fn run(
    transport: Arc<FrameTransport>,
    listener: Arc<dyn MessageListener>,
    state: Arc<Mutex<LoopState>>,
    mut cancelled: watch::Receiver<bool>,
) {
    let connection = transport.id();
    debug!(%connection, "receive loop started");

    loop {
        let received = tokio::select! {
            biased;
            _ = cancelled.changed() => break,
            received = transport.receive_one() => received,
        };

        match received {
            Ok(envelope) => listener.on_message(envelope).await,
            Err(error) => {
                *lock(&state) = LoopState::Stopped;
                debug!(%connection, %error, "receive loop terminating");
                transport.report_error(error);
                break;
            }
        }
    }

    debug!(%connection, "receive loop finished");
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
