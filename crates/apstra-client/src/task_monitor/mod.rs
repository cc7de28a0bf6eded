//! Asynchronous task tracking
//!
//! Mutating blueprint calls made with `async=full` return a task id instead
//! of a result. The task monitor turns those into awaitable results: callers
//! register `(blueprint, task)` through a [`TaskMonitorHandle`] and are woken
//! once the server reports the task finished.
//!
//! One background tokio task owns the [`PendingTasks`] registry. Callers
//! talk to it only through a bounded registration queue and a private
//! one-shot reply channel per wait, so the registry needs no lock.

mod monitor;
pub mod registry;

#[cfg(test)]
mod test_source;

use crate::config::TaskMonitorConfig;
use crate::error::ApstraError;
use crate::models::{ObjectId, TaskDetail, TaskId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

pub use registry::PendingTasks;

use monitor::TaskMonitor;

/// Result delivered to a waiter: the task's detail record or the reason it
/// could not be produced
pub type TaskCompletion = Result<TaskDetail, ApstraError>;

/// Narrow view of the transport the monitor polls through
#[async_trait::async_trait]
pub trait TaskStatusSource: Send + Sync {
    /// Coarse status of each listed task of one blueprint, keyed by task id.
    /// Tasks the server does not know are absent from the map.
    async fn poll_task_statuses(
        &self,
        blueprint_id: &ObjectId,
        task_ids: &[TaskId],
    ) -> Result<HashMap<TaskId, String>, ApstraError>;

    /// Full record of one finished task
    async fn fetch_task_detail(&self, blueprint_id: &ObjectId, task_id: &TaskId)
    -> Result<TaskDetail, ApstraError>;
}

/// Registration sent from a waiter to the monitor loop
#[derive(Debug)]
pub(crate) struct MonitorRequest {
    pub(crate) blueprint_id: ObjectId,
    pub(crate) task_id: TaskId,
    pub(crate) reply: oneshot::Sender<TaskCompletion>,
}

/// Cheap, cloneable entry point for waiting on tasks
#[derive(Debug, Clone)]
pub struct TaskMonitorHandle {
    requests: mpsc::Sender<MonitorRequest>,
}

impl TaskMonitorHandle {
    /// Wait until the monitor observes `task_id` leave the `init` /
    /// `in_progress` states, then return its detail record.
    ///
    /// The returned record may describe a failed or timed-out task; only
    /// protocol problems (task unknown to the server, unexpected status,
    /// detail fetch failure) surface as errors.
    pub async fn wait_for_task_completion(
        &self,
        blueprint_id: ObjectId,
        task_id: TaskId,
    ) -> Result<TaskDetail, ApstraError> {
        debug!(%blueprint_id, %task_id, "awaiting task completion");
        let (reply, completion) = oneshot::channel();

        self.requests
            .send(MonitorRequest {
                blueprint_id: blueprint_id.clone(),
                task_id: task_id.clone(),
                reply,
            })
            .await
            .map_err(|e| ApstraError::TaskMonitor(format!("task monitor is not running - {}", e)))?;

        completion.await.map_err(|e| {
            ApstraError::TaskMonitor(format!(
                "registration for blueprint '{}' task '{}' was dropped - {}",
                blueprint_id, task_id, e
            ))
        })?
    }
}

/// Stops the monitor and waits for it to drain
#[derive(Debug)]
pub struct TaskMonitorShutdown {
    quit: Option<oneshot::Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl TaskMonitorShutdown {
    /// Ask the monitor to stop once every registered task has been
    /// resolved, and wait for it to exit. Calling this twice is harmless.
    pub async fn shutdown(&mut self) {
        if let Some(quit) = self.quit.take() {
            // monitor may already have exited on its own
            let _ = quit.send(());
        }
        if let Some(join) = self.join.take() {
            if let Err(e) = join.await {
                error!("task monitor exited abnormally: {}", e);
            }
        }
    }

    /// True while the monitor task is still running
    pub fn is_running(&self) -> bool {
        self.join.as_ref().is_some_and(|j| !j.is_finished())
    }
}

/// Start a task monitor polling through `source`. Must be called from
/// within a tokio runtime.
pub fn spawn_task_monitor<S>(
    source: Arc<S>,
    config: TaskMonitorConfig,
    error_sink: Option<mpsc::UnboundedSender<ApstraError>>,
) -> (TaskMonitorHandle, TaskMonitorShutdown)
where
    S: TaskStatusSource + 'static,
{
    let (requests_tx, requests_rx) = mpsc::channel(config.queue_depth.max(1));
    let (quit_tx, quit_rx) = oneshot::channel();

    let monitor = TaskMonitor::new(source, config, requests_rx, quit_rx, error_sink);
    let join = tokio::spawn(monitor.run());
    info!("task monitor started");

    (
        TaskMonitorHandle { requests: requests_tx },
        TaskMonitorShutdown {
            quit: Some(quit_tx),
            join: Some(join),
        },
    )
}
