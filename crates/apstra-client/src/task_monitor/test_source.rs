//! Scripted in-memory [`TaskStatusSource`] for monitor tests

use super::TaskStatusSource;
use crate::error::ApstraError;
use crate::models::{ObjectId, TaskDetail, TaskId};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
pub(crate) struct ScriptedSource {
    statuses: Mutex<HashMap<ObjectId, HashMap<TaskId, String>>>,
    poll_failures: Mutex<HashMap<ObjectId, usize>>,
    detail_failures: Mutex<HashSet<(ObjectId, TaskId)>>,
    polled: Mutex<Vec<(ObjectId, Vec<TaskId>)>>,
    details: Mutex<Vec<(ObjectId, TaskId)>>,
    poll_count: AtomicUsize,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_status(&self, blueprint_id: &ObjectId, task_id: &TaskId, status: &str) {
        self.statuses
            .lock()
            .unwrap()
            .entry(blueprint_id.clone())
            .or_default()
            .insert(task_id.clone(), status.to_string());
    }

    pub(crate) fn forget(&self, blueprint_id: &ObjectId, task_id: &TaskId) {
        if let Some(tasks) = self.statuses.lock().unwrap().get_mut(blueprint_id) {
            tasks.remove(task_id);
        }
    }

    pub(crate) fn fail_next_polls(&self, blueprint_id: &ObjectId, count: usize) {
        self.poll_failures.lock().unwrap().insert(blueprint_id.clone(), count);
    }

    pub(crate) fn fail_detail(&self, blueprint_id: &ObjectId, task_id: &TaskId) {
        self.detail_failures
            .lock()
            .unwrap()
            .insert((blueprint_id.clone(), task_id.clone()));
    }

    pub(crate) fn poll_count(&self) -> usize {
        self.poll_count.load(Ordering::SeqCst)
    }

    pub(crate) fn polled(&self) -> Vec<(ObjectId, Vec<TaskId>)> {
        self.polled.lock().unwrap().clone()
    }

    pub(crate) fn detail_calls(&self) -> Vec<(ObjectId, TaskId)> {
        self.details.lock().unwrap().clone()
    }

    /// Block until at least `n` polls have been served in total
    pub(crate) async fn wait_for_polls(&self, n: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.poll_count() < n {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("timed out waiting for polls");
    }
}

#[async_trait::async_trait]
impl TaskStatusSource for ScriptedSource {
    async fn poll_task_statuses(
        &self,
        blueprint_id: &ObjectId,
        task_ids: &[TaskId],
    ) -> Result<HashMap<TaskId, String>, ApstraError> {
        self.polled
            .lock()
            .unwrap()
            .push((blueprint_id.clone(), task_ids.to_vec()));

        let failing = {
            let mut failures = self.poll_failures.lock().unwrap();
            match failures.get_mut(blueprint_id) {
                Some(remaining) if *remaining > 0 => {
                    *remaining -= 1;
                    true
                }
                _ => false,
            }
        };
        self.poll_count.fetch_add(1, Ordering::SeqCst);
        if failing {
            return Err(ApstraError::Api {
                status: 503,
                url: format!("/api/blueprints/{}/tasks/", blueprint_id),
                body: "unavailable".to_string(),
            });
        }

        let statuses = self.statuses.lock().unwrap();
        let known = statuses.get(blueprint_id);
        Ok(task_ids
            .iter()
            .filter_map(|id| known.and_then(|k| k.get(id)).map(|s| (id.clone(), s.clone())))
            .collect())
    }

    async fn fetch_task_detail(&self, blueprint_id: &ObjectId, task_id: &TaskId) -> Result<TaskDetail, ApstraError> {
        self.details
            .lock()
            .unwrap()
            .push((blueprint_id.clone(), task_id.clone()));

        if self
            .detail_failures
            .lock()
            .unwrap()
            .contains(&(blueprint_id.clone(), task_id.clone()))
        {
            return Err(ApstraError::NotFound(format!("task {} detail", task_id)));
        }

        let status = self
            .statuses
            .lock()
            .unwrap()
            .get(blueprint_id)
            .and_then(|tasks| tasks.get(task_id))
            .cloned()
            .unwrap_or_default();

        Ok(TaskDetail {
            id: task_id.clone(),
            status,
            ..Default::default()
        })
    }
}
