//! Tokio runtime wrapper shared by tweetie binaries.
//!
//! The runtime owns one [`CancellationToken`]. Fetches take a child of it, so
//! Ctrl-C or [`TweetieRuntime::shutdown`] stops them at the next page or lookup
//! boundary.
use std::time::Duration;

use anyhow::Result;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct RuntimeHandle {
    inner: Handle,
    cancel: CancellationToken,
}

pub struct TweetieRuntime {
    runtime: Runtime,
    cancel: CancellationToken,
}

impl TweetieRuntime {
    /// Build a multi-thread Tokio runtime.
    ///
    /// ```
    /// use tweetie_runtime::TweetieRuntime;
    /// use std::time::Duration;
    ///
    /// let runtime = TweetieRuntime::build("doctest-runtime", Some(1))
    ///     .expect("runtime builds");
    /// let value = runtime.block_on(async { 2 + 2 });
    /// assert_eq!(value, 4);
    /// runtime.shutdown(Duration::from_millis(10));
    /// ```
    pub fn build(thread_name: &str, worker_threads: Option<usize>) -> Result<Self> {
        let mut builder = Builder::new_multi_thread();
        builder.enable_all().thread_name(thread_name);

        if let Some(workers) = worker_threads {
            builder.worker_threads(workers.max(1));
        }

        let runtime = builder.build()?;
        Ok(Self {
            runtime,
            cancel: CancellationToken::new(),
        })
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            inner: self.runtime.handle().clone(),
            cancel: self.cancel.clone(),
        }
    }

    pub fn block_on<F: std::future::Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }

    /// Cancel outstanding work and shut the runtime down.
    ///
    /// ```
    /// use tweetie_runtime::TweetieRuntime;
    /// use std::time::Duration;
    ///
    /// let runtime = TweetieRuntime::build("shutdown-example", Some(1)).unwrap();
    /// let cancel = runtime.handle().cancellation();
    /// runtime.shutdown(Duration::from_millis(5));
    /// assert!(cancel.is_cancelled());
    /// ```
    pub fn shutdown(self, graceful: Duration) {
        self.cancel.cancel();
        self.runtime.shutdown_timeout(graceful);
    }
}

impl RuntimeHandle {
    pub fn spawn<F, T>(&self, fut: F) -> JoinHandle<T>
    where
        F: std::future::Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.inner.spawn(fut)
    }

    /// The runtime-wide token; cancelling it cancels every child.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// A token cancelled with the runtime, but cancellable on its own.
    pub fn child_token(&self) -> CancellationToken {
        self.cancel.child_token()
    }

    /// Cancel the runtime-wide token on the first Ctrl-C.
    pub fn cancel_on_ctrl_c(&self) -> JoinHandle<()> {
        let cancel = self.cancel.clone();
        self.spawn(async move {
            tokio::select! {
                res = tokio::signal::ctrl_c() => {
                    match res {
                        Ok(()) => tracing::warn!("runtime.ctrl_c"),
                        Err(err) => {
                            tracing::error!(error = %err, "runtime.ctrl_c.listen_failed");
                            return;
                        }
                    }
                    cancel.cancel();
                }
                _ = cancel.cancelled() => {}
            }
        })
    }
}
