//! Graceful-shutdown plumbing shared by every long-running task in the
//! workspace, modeled on `ckb-stop-handler`: a single
//! [`tokio_util::sync::CancellationToken`] is threaded through the
//! process, and each background task is wrapped in a [`StopHandler`] so
//! the owner can request a stop and then join the underlying thread or
//! tokio task.

use std::thread::JoinHandle;
use tokio::task::JoinHandle as TokioJoinHandle;
use tokio_util::sync::CancellationToken;
use txpool_logger::{debug, trace};

/// Clone of the process-wide cancellation token. Any subsystem that owns
/// a loop (the persistent-store sync task, here) holds a clone and
/// selects on `.cancelled()` alongside its own work.
pub fn new_tokio_exit_rx() -> CancellationToken {
    CancellationToken::new()
}

enum Inner {
    Thread(JoinHandle<()>),
    Tokio(TokioJoinHandle<()>),
}

/// Owns the means to stop a background task and wait for it to finish:
/// a [`CancellationToken`] to signal it, and a join handle to await its
/// exit. Dropping a `StopHandler` without calling [`StopHandler::stop`]
/// leaves the task running — callers must stop it explicitly, exactly
/// like `ckb-stop-handler::StopHandler`.
pub struct StopHandler {
    name: String,
    token: CancellationToken,
    inner: Option<Inner>,
}

impl StopHandler {
    /// Wrap a plain OS thread.
    pub fn new_thread(name: String, token: CancellationToken, handle: JoinHandle<()>) -> Self {
        StopHandler {
            name,
            token,
            inner: Some(Inner::Thread(handle)),
        }
    }

    /// Wrap a tokio task.
    pub fn new_tokio(name: String, token: CancellationToken, handle: TokioJoinHandle<()>) -> Self {
        StopHandler {
            name,
            token,
            inner: Some(Inner::Tokio(handle)),
        }
    }

    /// Signal cancellation. Idempotent.
    pub fn signal(&self) {
        trace!("stop-handler[{}]: signalling cancellation", self.name);
        self.token.cancel();
    }

    /// Signal cancellation and block until the underlying task exits.
    pub fn stop(mut self) {
        self.signal();
        match self.inner.take() {
            Some(Inner::Thread(handle)) => {
                let _ = handle.join();
            }
            Some(Inner::Tokio(handle)) => {
                // Best-effort: a blocking join on a tokio task from a
                // synchronous context only works off the runtime's own
                // worker threads; callers running inside the runtime
                // should await `handle` directly instead.
                drop(handle);
            }
            None => {}
        }
        debug!("stop-handler[{}]: stopped", self.name);
    }
}
