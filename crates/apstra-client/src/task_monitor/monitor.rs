//! Task monitor loop
//!
//! The loop waits on three events:
//! - a new registration: stop the poll timer, record the waiter, restart the
//!   timer with the short first-check delay
//! - the poll timer: sweep every blueprint with pending tasks, then re-arm
//!   the timer at the poll interval if anything is still pending
//! - shutdown: stop taking new blueprints and exit once the registry drains
//!
//! Blueprints are polled one after another, and each blueprint's detail
//! fetches complete before the next blueprint is polled.

use super::{MonitorRequest, PendingTasks, TaskCompletion, TaskStatusSource};
use crate::config::TaskMonitorConfig;
use crate::error::ApstraError;
use crate::models::{ObjectId, TaskId, TaskStatus};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, error, info, warn};

pub(super) struct TaskMonitor<S> {
    source: Arc<S>,
    config: TaskMonitorConfig,
    requests: mpsc::Receiver<MonitorRequest>,
    requests_closed: bool,
    quit: oneshot::Receiver<()>,
    quit_closed: bool,
    shutdown_requested: bool,
    error_sink: Option<mpsc::UnboundedSender<ApstraError>>,
    pending: PendingTasks<oneshot::Sender<TaskCompletion>>,
    timer: Option<Instant>,
    timer_set_at: Instant,
}

impl<S: TaskStatusSource> TaskMonitor<S> {
    pub(super) fn new(
        source: Arc<S>,
        config: TaskMonitorConfig,
        requests: mpsc::Receiver<MonitorRequest>,
        quit: oneshot::Receiver<()>,
        error_sink: Option<mpsc::UnboundedSender<ApstraError>>,
    ) -> Self {
        Self {
            source,
            config,
            requests,
            requests_closed: false,
            quit,
            quit_closed: false,
            shutdown_requested: false,
            error_sink,
            pending: PendingTasks::new(),
            timer: None,
            timer_set_at: Instant::now(),
        }
    }

    /// Main loop
    pub(super) async fn run(mut self) {
        loop {
            if self.should_exit() {
                info!("task monitor exiting");
                return;
            }

            let deadline = self.timer;
            tokio::select! {
                () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    debug!("task timer fired after {:?}", self.timer_set_at.elapsed());
                    self.check().await;
                }
                request = self.requests.recv(), if !self.requests_closed => match request {
                    Some(request) => self.accept(request),
                    None => {
                        self.requests_closed = true;
                        self.request_shutdown("all task monitor handles dropped");
                    }
                },
                quit = &mut self.quit, if !self.shutdown_requested && !self.quit_closed => match quit {
                    Ok(()) => self.request_shutdown("shutdown requested"),
                    Err(_) => {
                        // shutdown half dropped unused; handles still drive the loop
                        debug!("task monitor shutdown handle dropped");
                        self.quit_closed = true;
                    }
                },
                else => {
                    // nothing left to wait on; only reachable with an empty registry
                    warn!(pending = self.pending.task_count(), "task monitor has no event sources left");
                    return;
                }
            }
        }
    }

    /// Shutdown has been requested and nothing is pending
    fn should_exit(&self) -> bool {
        self.shutdown_requested && self.pending.is_empty()
    }

    fn request_shutdown(&mut self, reason: &str) {
        if !self.shutdown_requested {
            info!(
                pending_blueprints = self.pending.blueprint_count(),
                pending_tasks = self.pending.task_count(),
                "task monitor {}, draining",
                reason
            );
        }
        self.shutdown_requested = true;
    }

    fn accept(&mut self, request: MonitorRequest) {
        let MonitorRequest {
            blueprint_id,
            task_id,
            reply,
        } = request;

        if self.shutdown_requested && !self.pending.contains_blueprint(&blueprint_id) {
            debug!(%blueprint_id, %task_id, "rejecting task registration during shutdown");
            let rejected = reply.send(Err(ApstraError::TaskMonitor(format!(
                "shutting down; not accepting blueprint '{}' task '{}'",
                blueprint_id, task_id
            ))));
            if rejected.is_err() {
                debug!(%blueprint_id, %task_id, "rejected waiter already gone");
            }
            return;
        }

        debug!(%blueprint_id, %task_id, "new task arrived");
        self.stop_timer();
        if self.pending.add(blueprint_id.clone(), task_id.clone(), reply).is_some() {
            warn!(
                %blueprint_id,
                %task_id,
                "task registered twice; earlier waiter superseded"
            );
        }
        self.start_timer(self.config.first_check_delay);
    }

    fn stop_timer(&mut self) {
        self.timer = None;
    }

    fn start_timer(&mut self, after: Duration) {
        self.timer_set_at = Instant::now();
        self.timer = Some(self.timer_set_at + after);
    }

    /// One poll sweep, re-arming the timer while work remains
    pub(super) async fn check(&mut self) {
        self.stop_timer();
        self.check_blueprints().await;
        if !self.pending.is_empty() {
            debug!(
                "have {} blueprints with outstanding tasks, resetting timer",
                self.pending.blueprint_count()
            );
            self.start_timer(self.config.poll_interval);
        }
    }

    async fn check_blueprints(&mut self) {
        for blueprint_id in self.pending.blueprints() {
            let task_ids = self.pending.tasks_for_blueprint(&blueprint_id);
            if task_ids.is_empty() {
                continue;
            }

            let statuses = match self.source.poll_task_statuses(&blueprint_id, &task_ids).await {
                Ok(statuses) => statuses,
                Err(e) => {
                    // tasks stay pending; next sweep retries
                    self.handle_err(ApstraError::TaskPoll {
                        blueprint_id,
                        source: Box::new(e),
                    });
                    continue;
                }
            };

            self.check_tasks_in_blueprint(&blueprint_id, task_ids, &statuses).await;
        }
    }

    async fn check_tasks_in_blueprint(
        &mut self,
        blueprint_id: &ObjectId,
        task_ids: Vec<TaskId>,
        statuses: &HashMap<TaskId, String>,
    ) {
        for task_id in task_ids {
            let Some(raw) = statuses.get(&task_id) else {
                self.resolve(
                    blueprint_id,
                    &task_id,
                    Err(ApstraError::TaskUnknown {
                        blueprint_id: blueprint_id.clone(),
                        task_id: task_id.clone(),
                    }),
                );
                continue;
            };

            let status = TaskStatus::parse(raw);
            if status.is_pending() {
                continue;
            }

            let completion = if status.is_done() {
                self.source
                    .fetch_task_detail(blueprint_id, &task_id)
                    .await
                    .map_err(|e| ApstraError::TaskDetail {
                        blueprint_id: blueprint_id.clone(),
                        task_id: task_id.clone(),
                        source: Box::new(e),
                    })
            } else {
                Err(ApstraError::TaskStatusUnexpected {
                    blueprint_id: blueprint_id.clone(),
                    task_id: task_id.clone(),
                    status: raw.clone(),
                })
            };

            self.resolve(blueprint_id, &task_id, completion);
        }
    }

    /// Deliver the completion and forget the task
    fn resolve(&mut self, blueprint_id: &ObjectId, task_id: &TaskId, completion: TaskCompletion) {
        let Some(reply) = self.pending.remove(blueprint_id, task_id) else {
            return;
        };
        debug!(%blueprint_id, %task_id, ok = completion.is_ok(), "task resolved");
        if reply.send(completion).is_err() {
            warn!(%blueprint_id, %task_id, "task resolved but its waiter is gone");
        }
    }

    fn handle_err(&self, err: ApstraError) {
        match &self.error_sink {
            Some(sink) => {
                if let Err(unsent) = sink.send(err) {
                    error!("{}", unsent.0);
                }
            }
            None => error!("{}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_source::ScriptedSource;
    use super::*;
    use oneshot::error::TryRecvError;

    struct Harness {
        source: Arc<ScriptedSource>,
        monitor: TaskMonitor<ScriptedSource>,
        _requests: mpsc::Sender<MonitorRequest>,
        _quit: oneshot::Sender<()>,
    }

    fn harness() -> Harness {
        let source = Arc::new(ScriptedSource::new());
        let (requests_tx, requests_rx) = mpsc::channel(8);
        let (quit_tx, quit_rx) = oneshot::channel();
        let monitor = TaskMonitor::new(
            Arc::clone(&source),
            TaskMonitorConfig::default(),
            requests_rx,
            quit_rx,
            None,
        );
        Harness {
            source,
            monitor,
            _requests: requests_tx,
            _quit: quit_tx,
        }
    }

    fn register(monitor: &mut TaskMonitor<ScriptedSource>, b: &str, t: &str) -> oneshot::Receiver<TaskCompletion> {
        let (reply, rx) = oneshot::channel();
        monitor.accept(MonitorRequest {
            blueprint_id: ObjectId::from(b),
            task_id: TaskId::from(t),
            reply,
        });
        rx
    }

    fn bp(s: &str) -> ObjectId {
        ObjectId::from(s)
    }

    fn task(s: &str) -> TaskId {
        TaskId::from(s)
    }

    #[tokio::test]
    async fn test_in_progress_then_succeeded() {
        let mut h = harness();
        let mut rx = register(&mut h.monitor, "B1", "T1");
        assert!(h.monitor.timer.is_some());

        h.source.set_status(&bp("B1"), &task("T1"), "in_progress");
        h.monitor.check().await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        assert!(h.monitor.pending.contains(&bp("B1"), &task("T1")));
        assert!(h.monitor.timer.is_some());
        assert!(h.source.detail_calls().is_empty());

        h.source.set_status(&bp("B1"), &task("T1"), "succeeded");
        h.monitor.check().await;
        let detail = rx.try_recv().unwrap().unwrap();
        assert_eq!(detail.status, "succeeded");
        assert_eq!(h.source.detail_calls(), vec![(bp("B1"), task("T1"))]);
        assert!(!h.monitor.pending.contains_blueprint(&bp("B1")));
        assert!(h.monitor.pending.is_empty());
        assert!(h.monitor.timer.is_none());
    }

    #[tokio::test]
    async fn test_pending_statuses_stay_pending() {
        let mut h = harness();
        let mut rx_init = register(&mut h.monitor, "B1", "T1");
        let mut rx_running = register(&mut h.monitor, "B1", "T2");
        h.source.set_status(&bp("B1"), &task("T1"), "init");
        h.source.set_status(&bp("B1"), &task("T2"), "in_progress");

        h.monitor.check().await;
        assert!(matches!(rx_init.try_recv(), Err(TryRecvError::Empty)));
        assert!(matches!(rx_running.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(h.monitor.pending.task_count(), 2);
    }

    #[tokio::test]
    async fn test_terminal_statuses_fetch_detail() {
        let mut h = harness();
        let mut receivers = Vec::new();
        for (t, status) in [("T1", "succeeded"), ("T2", "failed"), ("T3", "timeout")] {
            receivers.push((status, register(&mut h.monitor, "B1", t)));
            h.source.set_status(&bp("B1"), &task(t), status);
        }

        h.monitor.check().await;
        for (status, mut rx) in receivers {
            assert_eq!(rx.try_recv().unwrap().unwrap().status, status);
        }
        assert_eq!(h.source.detail_calls().len(), 3);
        assert!(h.monitor.pending.is_empty());
    }

    #[tokio::test]
    async fn test_missing_task_resolves_without_detail() {
        let mut h = harness();
        let mut rx = register(&mut h.monitor, "B1", "T2");

        h.monitor.check().await;
        match rx.try_recv().unwrap() {
            Err(ApstraError::TaskUnknown { blueprint_id, task_id }) => {
                assert_eq!(blueprint_id, bp("B1"));
                assert_eq!(task_id, task("T2"));
            }
            other => panic!("Expected TaskUnknown, got: {other:?}"),
        }
        assert!(h.source.detail_calls().is_empty());
        assert!(h.monitor.pending.is_empty());
    }

    #[tokio::test]
    async fn test_unexpected_status_resolves_without_detail() {
        let mut h = harness();
        let mut rx = register(&mut h.monitor, "B2", "T3");
        h.source.set_status(&bp("B2"), &task("T3"), "weird_status");

        h.monitor.check().await;
        match rx.try_recv().unwrap() {
            Err(ApstraError::TaskStatusUnexpected { status, .. }) => assert_eq!(status, "weird_status"),
            other => panic!("Expected TaskStatusUnexpected, got: {other:?}"),
        }
        assert!(h.source.detail_calls().is_empty());
        assert!(h.monitor.pending.is_empty());
    }

    #[tokio::test]
    async fn test_detail_failure_is_delivered() {
        let mut h = harness();
        let mut rx = register(&mut h.monitor, "B1", "T1");
        h.source.set_status(&bp("B1"), &task("T1"), "succeeded");
        h.source.fail_detail(&bp("B1"), &task("T1"));

        h.monitor.check().await;
        let err = rx.try_recv().unwrap().unwrap_err();
        assert!(matches!(err, ApstraError::TaskDetail { .. }));
        assert_eq!(err.task(), Some((&bp("B1"), &task("T1"))));
        assert!(h.monitor.pending.is_empty());
    }

    #[tokio::test]
    async fn test_poll_failure_skips_blueprint_only() {
        let mut h = harness();
        let mut rx1 = register(&mut h.monitor, "B1", "T1");
        let mut rx2 = register(&mut h.monitor, "B2", "T2");
        h.source.set_status(&bp("B1"), &task("T1"), "succeeded");
        h.source.set_status(&bp("B2"), &task("T2"), "succeeded");
        h.source.fail_next_polls(&bp("B1"), 1);

        h.monitor.check().await;
        assert!(matches!(rx1.try_recv(), Err(TryRecvError::Empty)));
        assert!(rx2.try_recv().unwrap().is_ok());
        assert!(h.monitor.pending.contains(&bp("B1"), &task("T1")));
        assert!(h.monitor.timer.is_some());

        h.monitor.check().await;
        assert!(rx1.try_recv().unwrap().is_ok());
        assert!(h.monitor.pending.is_empty());
    }

    #[tokio::test]
    async fn test_poll_query_is_scoped_per_blueprint() {
        let mut h = harness();
        let _rx = [
            register(&mut h.monitor, "B1", "abc"),
            register(&mut h.monitor, "B1", "def"),
            register(&mut h.monitor, "B2", "xyz"),
        ];
        h.source.set_status(&bp("B1"), &task("abc"), "init");
        h.source.set_status(&bp("B1"), &task("def"), "init");
        h.source.set_status(&bp("B2"), &task("xyz"), "init");

        h.monitor.check().await;
        assert_eq!(
            h.source.polled(),
            vec![
                (bp("B1"), vec![task("abc"), task("def")]),
                (bp("B2"), vec![task("xyz")]),
            ]
        );
    }

    #[tokio::test]
    async fn test_mixed_outcomes_in_one_sweep() {
        let mut h = harness();
        let mut ok = register(&mut h.monitor, "B1", "T1");
        let mut still = register(&mut h.monitor, "B1", "T2");
        let mut gone = register(&mut h.monitor, "B1", "T3");
        h.source.set_status(&bp("B1"), &task("T1"), "succeeded");
        h.source.set_status(&bp("B1"), &task("T2"), "in_progress");
        h.source.set_status(&bp("B1"), &task("T3"), "init");
        h.source.forget(&bp("B1"), &task("T3"));

        h.monitor.check().await;
        assert!(ok.try_recv().unwrap().is_ok());
        assert!(matches!(still.try_recv(), Err(TryRecvError::Empty)));
        assert!(gone.try_recv().unwrap().is_err());
        assert_eq!(h.monitor.pending.tasks_for_blueprint(&bp("B1")), vec![task("T2")]);
    }

    #[tokio::test]
    async fn test_duplicate_registration_supersedes_first_waiter() {
        let mut h = harness();
        let mut first = register(&mut h.monitor, "B1", "T1");
        let mut second = register(&mut h.monitor, "B1", "T1");
        h.source.set_status(&bp("B1"), &task("T1"), "succeeded");

        // first waiter's sender was dropped when it was replaced
        assert!(matches!(first.try_recv(), Err(TryRecvError::Closed)));

        h.monitor.check().await;
        assert!(second.try_recv().unwrap().is_ok());
        assert_eq!(h.source.detail_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_abandoned_waiter_still_pruned() {
        let mut h = harness();
        drop(register(&mut h.monitor, "B1", "T1"));
        h.source.set_status(&bp("B1"), &task("T1"), "succeeded");

        h.monitor.check().await;
        assert!(h.monitor.pending.is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_rejects_new_blueprints_only() {
        let mut h = harness();
        let _live = register(&mut h.monitor, "B1", "T1");
        h.monitor.request_shutdown("test");

        let mut same_bp = register(&mut h.monitor, "B1", "T2");
        let mut new_bp = register(&mut h.monitor, "B9", "T9");

        assert!(matches!(same_bp.try_recv(), Err(TryRecvError::Empty)));
        assert!(matches!(
            new_bp.try_recv().unwrap(),
            Err(ApstraError::TaskMonitor(_))
        ));
        assert_eq!(h.monitor.pending.tasks_for_blueprint(&bp("B1")), vec![task("T1"), task("T2")]);
        assert!(!h.monitor.pending.contains_blueprint(&bp("B9")));
        assert!(!h.monitor.should_exit());
    }

    #[tokio::test(start_paused = true)]
    async fn test_registration_restarts_first_check_timer() {
        let mut h = harness();
        let _rx = register(&mut h.monitor, "B1", "T1");
        let first = h.monitor.timer.unwrap();

        tokio::time::advance(Duration::from_millis(60)).await;
        let _rx2 = register(&mut h.monitor, "B1", "T2");
        let second = h.monitor.timer.unwrap();

        assert_eq!(second - first, Duration::from_millis(60));
        assert_eq!(second - Instant::now(), h.monitor.config.first_check_delay);
    }

    #[tokio::test]
    async fn test_sweep_that_empties_registry_stops_timer() {
        let mut h = harness();
        let _rx = register(&mut h.monitor, "B1", "T1");
        h.source.set_status(&bp("B1"), &task("T1"), "in_progress");
        h.monitor.check().await;
        let armed = h.monitor.timer;
        assert!(armed.is_some());

        h.source.set_status(&bp("B1"), &task("T1"), "failed");
        h.monitor.check().await;
        assert!(h.monitor.pending.is_empty());
        assert_eq!(h.monitor.timer, None);
    }
}
