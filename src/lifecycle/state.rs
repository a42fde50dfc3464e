//! Server phase state machine and readiness flag.
//!
//! # States
//! ```text
//! Created → Starting → Listening → Closing → Closed
//!             │            │                   ▲
//!             │            └── engine error ───┤
//!             └── hook/bind failure → Created  │
//! close() from Created ────────────────────────┘
//! ```
//!
//! # Design Decisions
//! - The phase lives in a watch channel so `close` can wait on it as a
//!   completion barrier and the engine can use it as its shutdown signal
//! - Readiness is a separate atomic so readiness checks never touch the channel lock
//! - `Closed` is terminal

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

use crate::error::ServerError;

/// How the serving loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// All connections drained, or the server never served.
    Graceful,
    /// The grace period elapsed with connections still open.
    Forced,
    /// The engine stopped with an error.
    Failed,
}

/// Lifecycle phase of a managed server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Created,
    /// Initializer running or listener being bound.
    Starting,
    Listening,
    /// Shutdown requested, connections draining.
    Closing,
    Closed(Exit),
}

/// Shared lifecycle state for one server.
pub struct Lifecycle {
    phase: watch::Sender<Phase>,
    ready: AtomicBool,
}

impl Lifecycle {
    pub fn new() -> Self {
        let (phase, _) = watch::channel(Phase::Created);
        Self {
            phase,
            ready: AtomicBool::new(false),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Move `Created → Starting`.
    ///
    /// The returned guard settles the phase when dropped, so a cancelled or
    /// failed start never leaves the server half started.
    pub fn start(&self) -> Result<StartGuard<'_>, ServerError> {
        let mut outcome = Ok(());
        self.phase.send_if_modified(|phase| match phase {
            Phase::Created => {
                *phase = Phase::Starting;
                true
            }
            Phase::Starting | Phase::Listening => {
                outcome = Err(ServerError::AlreadyListening);
                false
            }
            Phase::Closing | Phase::Closed(_) => {
                outcome = Err(ServerError::Closed);
                false
            }
        });
        outcome.map(|()| StartGuard {
            lifecycle: self,
            serving: false,
            exit: Exit::Forced,
        })
    }

    /// Request shutdown and return the phase observed before the request.
    pub fn request_close(&self) -> Phase {
        let mut previous = Phase::Created;
        self.phase.send_if_modified(|phase| {
            previous = *phase;
            match phase {
                Phase::Created => {
                    *phase = Phase::Closed(Exit::Graceful);
                    true
                }
                Phase::Starting | Phase::Listening => {
                    *phase = Phase::Closing;
                    true
                }
                Phase::Closing | Phase::Closed(_) => false,
            }
        });
        previous
    }

    /// Resolves once shutdown has been requested.
    pub fn closing(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.phase.subscribe();
        async move {
            let _ = rx
                .wait_for(|phase| matches!(phase, Phase::Closing | Phase::Closed(_)))
                .await;
        }
    }

    /// Wait until the serving loop has fully exited.
    pub async fn wait_closed(&self) -> Exit {
        let mut rx = self.phase.subscribe();
        let closed = rx
            .wait_for(|phase| matches!(phase, Phase::Closed(_)))
            .await
            .map(|phase| *phase);

        match closed {
            Ok(Phase::Closed(exit)) => exit,
            // the sender lives as long as `self`
            _ => Exit::Graceful,
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Held by `listen` from `Starting` until the serving loop exits.
pub struct StartGuard<'a> {
    lifecycle: &'a Lifecycle,
    serving: bool,
    exit: Exit,
}

impl StartGuard<'_> {
    /// Move `Starting → Listening` and mark the server ready.
    ///
    /// Fails with [`ServerError::Closed`] if shutdown was requested while
    /// starting.
    pub fn serving(&mut self) -> Result<(), ServerError> {
        let promoted = self.lifecycle.phase.send_if_modified(|phase| {
            if *phase == Phase::Starting {
                *phase = Phase::Listening;
                true
            } else {
                false
            }
        });
        if !promoted {
            return Err(ServerError::Closed);
        }

        self.serving = true;
        self.lifecycle.ready.store(true, Ordering::Release);
        Ok(())
    }

    /// Record how the serving loop ended and release the guard.
    pub fn finish(mut self, exit: Exit) {
        self.exit = exit;
    }
}

impl Drop for StartGuard<'_> {
    fn drop(&mut self) {
        self.lifecycle.ready.store(false, Ordering::Release);

        let serving = self.serving;
        let exit = self.exit;
        self.lifecycle.phase.send_modify(|phase| {
            *phase = match *phase {
                Phase::Starting if !serving => Phase::Created,
                Phase::Closing if !serving => Phase::Closed(Exit::Graceful),
                Phase::Listening | Phase::Closing => Phase::Closed(exit),
                other => other,
            };
        });
    }
}
