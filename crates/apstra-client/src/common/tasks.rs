//! Task endpoints used by the task monitor

use crate::common::HttpClient;
use crate::common::query::{query_items, task_list_to_filter_expr};
use crate::error::ApstraError;
use crate::models::{ObjectId, TaskDetail, TaskId, TaskSummary};
use crate::task_monitor::TaskStatusSource;
use std::collections::HashMap;
use tracing::debug;

/// Task list path of one blueprint
pub(crate) fn blueprint_tasks_path(blueprint_id: &ObjectId) -> String {
    format!("/api/blueprints/{}/tasks/", blueprint_id)
}

/// Task detail path
pub(crate) fn blueprint_task_path(blueprint_id: &ObjectId, task_id: &TaskId) -> String {
    format!("/api/blueprints/{}/tasks/{}", blueprint_id, task_id)
}

impl HttpClient {
    /// Task summaries of one blueprint, optionally restricted to `task_ids`
    pub async fn get_blueprint_task_summaries(
        &self,
        blueprint_id: &ObjectId,
        task_ids: &[TaskId],
    ) -> Result<Vec<TaskSummary>, ApstraError> {
        let path = blueprint_tasks_path(blueprint_id);
        if task_ids.is_empty() {
            return query_items(self, &path, &[]).await;
        }
        let filter = task_list_to_filter_expr(task_ids);
        query_items(self, &path, &[("filter", filter.as_str())]).await
    }

    /// Full record of one task
    pub async fn get_blueprint_task_detail(
        &self,
        blueprint_id: &ObjectId,
        task_id: &TaskId,
    ) -> Result<TaskDetail, ApstraError> {
        self.get(&blueprint_task_path(blueprint_id, task_id), &[]).await
    }
}

#[async_trait::async_trait]
impl TaskStatusSource for HttpClient {
    async fn poll_task_statuses(
        &self,
        blueprint_id: &ObjectId,
        task_ids: &[TaskId],
    ) -> Result<HashMap<TaskId, String>, ApstraError> {
        let summaries = self.get_blueprint_task_summaries(blueprint_id, task_ids).await?;
        debug!(%blueprint_id, requested = task_ids.len(), returned = summaries.len(), "polled task status");

        let mut statuses = HashMap::with_capacity(summaries.len());
        for summary in summaries {
            if summary.id.is_empty() || summary.status.is_empty() {
                return Err(ApstraError::Decode {
                    url: blueprint_tasks_path(blueprint_id),
                    message: format!(
                        "task list item missing id or status (id '{}', status '{}')",
                        summary.id, summary.status
                    ),
                });
            }
            statuses.insert(summary.id, summary.status);
        }
        Ok(statuses)
    }

    async fn fetch_task_detail(&self, blueprint_id: &ObjectId, task_id: &TaskId) -> Result<TaskDetail, ApstraError> {
        self.get_blueprint_task_detail(blueprint_id, task_id).await
    }
}
