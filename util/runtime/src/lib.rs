//! A thin wrapper around a `tokio` runtime, modeled on `ckb-async-runtime`:
//! the embedding binary constructs one [`Handle`] at startup and hands
//! clones of it to every subsystem that needs to spawn background work
//! (here, the tx-pool's persistent-store sync task).

use std::future::Future;
use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;

/// A cheaply-clonable handle into a background `tokio` runtime.
#[derive(Clone)]
pub struct Handle {
    inner: tokio::runtime::Handle,
}

impl Handle {
    /// Spawn a future onto the runtime, detached from the caller.
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.inner.spawn(future)
    }

    /// Block the current thread until `future` completes. Only valid off
    /// the runtime's own worker threads.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.inner.block_on(future)
    }
}

/// Construct a new multi-threaded background runtime plus the join handle
/// of the thread driving it, following `ckb-async-runtime::new_global`'s
/// split between "the runtime" and "the thread that keeps it alive".
pub fn new_background_runtime() -> (Handle, std::thread::JoinHandle<()>) {
    let (tx, rx) = std::sync::mpsc::sync_channel(1);
    let thread = std::thread::Builder::new()
        .name("txpool-runtime".to_string())
        .spawn(move || {
            let runtime = Builder::new_multi_thread()
                .enable_all()
                .thread_name("txpool-async")
                .build()
                .expect("create tokio runtime");
            tx.send(runtime.handle().clone())
                .expect("send runtime handle");
            block_forever(&runtime);
        })
        .expect("spawn txpool-runtime thread");
    let inner = rx.recv().expect("receive runtime handle");
    (Handle { inner }, thread)
}

fn block_forever(runtime: &Runtime) {
    runtime.block_on(async {
        loop {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_runs_on_background_runtime() {
        let (handle, _guard) = new_background_runtime();
        let (tx, rx) = std::sync::mpsc::channel();
        handle.spawn(async move {
            tx.send(7u8).unwrap();
        });
        assert_eq!(rx.recv_timeout(std::time::Duration::from_secs(1)), Ok(7));
    }
}
