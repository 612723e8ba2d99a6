//! Turns raw cursor movement into position events.
//!
//! Every movement is forwarded at once as [`HostEvent::PositionMoved`]. Once
//! the cursor has stayed put for the debounce interval, a single
//! [`HostEvent::PositionSettled`] carrying the last position follows.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;

use super::HostEvent;
use crate::types::{Position, ScopeId};

pub struct CursorDebouncer {
    input: mpsc::UnboundedSender<(ScopeId, Position)>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
    debounce: Duration,
}

impl CursorDebouncer {
    /// Spawn the debouncer on the current tokio runtime.
    pub fn spawn(debounce: Duration, events: mpsc::UnboundedSender<HostEvent>) -> Self {
        Self::with_cancellation(debounce, events, CancellationToken::new())
    }

    pub fn with_cancellation(
        debounce: Duration,
        events: mpsc::UnboundedSender<HostEvent>,
        cancel: CancellationToken,
    ) -> Self {
        let (input, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(debounce, rx, events, cancel.clone()));
        Self {
            input,
            cancel,
            handle,
            debounce,
        }
    }

    /// Report a cursor movement. Returns `false` once the debouncer stopped.
    pub fn moved(&self, scope: ScopeId, position: Position) -> bool {
        self.input.send((scope, position)).is_ok()
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Cancel and wait for the task to finish.
    pub async fn join(self) {
        self.cancel.cancel();
        let handle = self.handle;
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "Cursor debouncer task failed");
        }
    }
}

impl std::fmt::Debug for CursorDebouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorDebouncer")
            .field("debounce", &self.debounce)
            .field("running", &self.is_running())
            .finish()
    }
}

async fn run(
    debounce: Duration,
    mut input: mpsc::UnboundedReceiver<(ScopeId, Position)>,
    events: mpsc::UnboundedSender<HostEvent>,
    cancel: CancellationToken,
) {
    let timer = sleep(debounce);
    tokio::pin!(timer);
    let mut pending: Option<(ScopeId, Position)> = None;

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => break,

            moved = input.recv() => {
                let Some((scope, position)) = moved else { break };
                if events.send(HostEvent::PositionMoved { scope, position }).is_err() {
                    break;
                }
                pending = Some((scope, position));
                timer.as_mut().reset(Instant::now() + debounce);
            }

            _ = &mut timer, if pending.is_some() => {
                if let Some((scope, position)) = pending.take()
                    && events.send(HostEvent::PositionSettled { scope, position }).is_err()
                {
                    break;
                }
            }
        }
    }

    tracing::debug!("Cursor debouncer stopped");
}
