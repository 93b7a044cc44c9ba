//! Single-flight bridge from synchronous node callbacks to the async skill client.
//!
//! There is one bridge per process. It owns a tokio scheduler with a single
//! worker thread, and every remote call runs on it. [`TaskBridge::run`]
//! picks one of two dispatch branches by comparing the calling thread with
//! the threads the scheduler owns:
//!
//! - **Loop thread.** The caller is already executing on the scheduler, so
//!   spawning and waiting would wait on itself. The task is instead driven in
//!   place: `block_in_place` hands the worker's queue to a fresh thread and
//!   `Handle::block_on` re-enters the *same* scheduler for this one future.
//!   No nested runtime is ever created.
//! - **Foreign thread.** The task is spawned onto the loop and only the
//!   calling thread blocks on its join handle.
//!
//! The bridge does not retry, batch or deduplicate. A task either returns
//! its result or its error; a shutdown while it is in flight surfaces as
//! [`NodeError::Cancelled`].

use crate::core::error::NodeError;
use std::cell::Cell;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::{Builder, Handle, Runtime};

/// Grace period used by [`TaskBridge::shutdown`].
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

static BRIDGE: Mutex<Option<Arc<TaskBridge>>> = Mutex::new(None);
static NEXT_BRIDGE_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    // Id of the bridge whose scheduler owns this thread, 0 for foreign threads.
    static LOOP_OWNER: Cell<u64> = const { Cell::new(0) };
}

/// Process-wide event loop that runs every skill call.
pub struct TaskBridge {
    id: u64,
    handle: Handle,
    runtime: Mutex<Option<Runtime>>,
    next_task: AtomicU64,
}

impl TaskBridge {
    /// Returns the process-wide bridge, starting it on first use.
    pub fn acquire() -> Result<Arc<TaskBridge>, NodeError> {
        let mut slot = BRIDGE.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bridge) = slot.as_ref() {
            return Ok(Arc::clone(bridge));
        }
        let bridge = Arc::new(TaskBridge::start()?);
        *slot = Some(Arc::clone(&bridge));
        Ok(bridge)
    }

    /// True while a bridge is installed.
    pub fn is_running() -> bool {
        BRIDGE
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Shuts the process-wide bridge down with the default grace period.
    pub fn shutdown() {
        Self::shutdown_timeout(DEFAULT_SHUTDOWN_GRACE);
    }

    /// Removes the process-wide bridge and stops its scheduler.
    ///
    /// Tasks still running after `grace` are dropped and their callers get
    /// [`NodeError::Cancelled`]. The next [`acquire`](Self::acquire) starts
    /// a fresh bridge.
    pub fn shutdown_timeout(grace: Duration) {
        let bridge = BRIDGE
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(bridge) = bridge {
            bridge.stop(grace);
        }
    }

    fn start() -> Result<Self, NodeError> {
        let id = NEXT_BRIDGE_ID.fetch_add(1, Ordering::Relaxed);
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("skill-bridge")
            .on_thread_start(move || LOOP_OWNER.with(|owner| owner.set(id)))
            .on_thread_stop(|| LOOP_OWNER.with(|owner| owner.set(0)))
            .enable_all()
            .build()
            .map_err(|err| NodeError::Bridge(format!("could not start the event loop: {err}")))?;
        log::info!("Started task bridge #{id}");

        Ok(TaskBridge {
            id,
            handle: runtime.handle().clone(),
            runtime: Mutex::new(Some(runtime)),
            next_task: AtomicU64::new(1),
        })
    }

    fn stop(&self, grace: Duration) {
        let runtime = self
            .runtime
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(runtime) = runtime else {
            return;
        };
        // A runtime cannot wait for itself from inside an async context.
        if Handle::try_current().is_ok() {
            runtime.shutdown_background();
        } else {
            runtime.shutdown_timeout(grace);
        }
        log::info!("Shut down task bridge #{}", self.id);
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Handle to the bridge's scheduler.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// True when the calling thread belongs to this bridge's scheduler.
    pub fn on_loop_thread(&self) -> bool {
        LOOP_OWNER.with(|owner| owner.get()) == self.id
    }

    /// Runs one task to completion and returns its result to a synchronous caller.
    pub fn run<F, T>(&self, task: F) -> Result<T, NodeError>
    where
        F: Future<Output = Result<T, NodeError>> + Send + 'static,
        T: Send + 'static,
    {
        let task_id = self.next_task.fetch_add(1, Ordering::Relaxed);

        let result = if self.on_loop_thread() {
            log::debug!("Task {task_id}: caller is on the loop, driving it in place");
            tokio::task::block_in_place(|| self.handle.block_on(task))
        } else {
            log::debug!("Task {task_id}: scheduling onto bridge #{}", self.id);
            let join = self.handle.spawn(task);
            match futures::executor::block_on(join) {
                Ok(result) => result,
                Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                Err(_) => {
                    log::warn!("Task {task_id} was cancelled by a bridge shutdown");
                    Err(NodeError::Cancelled)
                }
            }
        };

        match &result {
            Ok(_) => log::debug!("Task {task_id}: completed"),
            Err(err) => log::debug!("Task {task_id}: failed: {err}"),
        }
        result
    }
}

impl Drop for TaskBridge {
    fn drop(&mut self) {
        let runtime = self
            .runtime
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(runtime) = runtime {
            runtime.shutdown_background();
        }
    }
}
