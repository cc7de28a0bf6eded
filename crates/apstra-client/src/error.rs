//! Apstra client errors

use crate::models::{ObjectId, TaskId};
use thiserror::Error;

/// Errors that can occur when interacting with the Apstra API
#[derive(Debug, Error)]
pub enum ApstraError {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Apstra API returned a non-success status
    #[error("Apstra API error: http {status} at '{url}' - {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Request URL
        url: String,
        /// Response body (truncated)
        body: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Response body could not be decoded into the expected type
    #[error("error decoding response from '{url}': {message}")]
    Decode {
        /// Request URL
        url: String,
        /// Decoder message plus the head of the body
        message: String,
    },

    /// Authentication failed (bad credentials, token rejected after re-login)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource exists or is in use
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Invalid request (e.g., missing required fields, ambiguous lookup)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Server reports an API version this client does not support
    #[error("unsupported API version: '{version}'")]
    UnsupportedVersion {
        /// Version string reported by the server
        version: String,
    },

    /// Batched task status query for one blueprint failed
    #[error("error getting tasks for blueprint '{blueprint_id}' - {source}")]
    TaskPoll {
        /// Blueprint whose tasks were being polled
        blueprint_id: ObjectId,
        /// Underlying error
        #[source]
        source: Box<ApstraError>,
    },

    /// A monitored task id was missing from the server's task list
    #[error("blueprint '{blueprint_id}' task '{task_id}' unknown to Apstra server")]
    TaskUnknown {
        /// Owning blueprint
        blueprint_id: ObjectId,
        /// Task that vanished
        task_id: TaskId,
    },

    /// A monitored task reported a status outside the known vocabulary
    #[error("blueprint '{blueprint_id}' task '{task_id}' status unexpected: {status}")]
    TaskStatusUnexpected {
        /// Owning blueprint
        blueprint_id: ObjectId,
        /// Task id
        task_id: TaskId,
        /// Status string as received
        status: String,
    },

    /// Fetching the detail record of a finished task failed
    #[error("blueprint '{blueprint_id}' task '{task_id}' detail fetch failed - {source}")]
    TaskDetail {
        /// Owning blueprint
        blueprint_id: ObjectId,
        /// Task id
        task_id: TaskId,
        /// Underlying error
        #[source]
        source: Box<ApstraError>,
    },

    /// A task finished with a status other than `succeeded`
    #[error("blueprint '{blueprint_id}' task '{task_id}' finished with status '{status}': {errors}")]
    TaskFailed {
        /// Owning blueprint
        blueprint_id: ObjectId,
        /// Task id
        task_id: TaskId,
        /// Terminal status (`failed`, `timeout`)
        status: String,
        /// `detailed_status.errors` from the task record
        errors: serde_json::Value,
    },

    /// The task monitor is gone or refused/dropped a registration
    #[error("task monitor: {0}")]
    TaskMonitor(String),
}

impl ApstraError {
    /// True for 404 responses and failed by-name lookups
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApstraError::NotFound(_))
    }

    /// Blueprint and task named by a task-related error
    pub fn task(&self) -> Option<(&ObjectId, &TaskId)> {
        match self {
            ApstraError::TaskUnknown { blueprint_id, task_id }
            | ApstraError::TaskStatusUnexpected { blueprint_id, task_id, .. }
            | ApstraError::TaskDetail { blueprint_id, task_id, .. }
            | ApstraError::TaskFailed { blueprint_id, task_id, .. } => Some((blueprint_id, task_id)),
            _ => None,
        }
    }
}
