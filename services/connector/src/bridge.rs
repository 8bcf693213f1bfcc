use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::warn;

use crate::error::ConnectorError;

/// Dedicated execution context for remote-network operations.
///
/// Owns one OS thread running a current-thread tokio runtime; [`Self::run`]
/// dispatches a task onto it and blocks the caller for at most the
/// configured ceiling. On timeout the task is aborted, so it cannot keep
/// running and mutate shared state after the caller has already seen the
/// timeout; any client connection it owned closes when it is dropped.
pub struct ExecutionBridge {
    handle: tokio::runtime::Handle,
    ceiling: Duration,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl ExecutionBridge {
    pub fn new(ceiling: Duration) -> Self {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("failed to build bridge runtime");
        let handle = runtime.handle().clone();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let thread = std::thread::Builder::new()
            .name("execution-bridge".to_owned())
            .spawn(move || {
                // Parks until shutdown while driving every spawned task.
                let _ = runtime.block_on(shutdown_rx);
            })
            .expect("failed to spawn bridge thread");
        Self {
            handle,
            ceiling,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        }
    }

    /// Schedule `task` onto the bridge runtime and wait for its result,
    /// bounded by the ceiling.
    pub async fn run<T, F>(&self, task: F) -> Result<T, ConnectorError>
    where
        F: Future<Output = Result<T, ConnectorError>> + Send + 'static,
        T: Send + 'static,
    {
        let mut join = self.handle.spawn(task);
        match tokio::time::timeout(self.ceiling, &mut join).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(ConnectorError::Internal(anyhow::anyhow!(
                "bridged task failed: {join_err}"
            ))),
            Err(_elapsed) => {
                warn!(ceiling_secs = self.ceiling.as_secs(), "bridged task timed out, aborting");
                join.abort();
                Err(ConnectorError::Timeout)
            }
        }
    }
}

impl Drop for ExecutionBridge {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
