//! Blueprint operations for MockApstraClient
//!
//! Handles blueprints, security zones and the tasks their mutations leave
//! behind

use super::MockApstraClient;
use super::helpers::{lock, new_object_id, new_task_id, now, succeeded_task};
use crate::common::query::find_exactly_one;
use crate::error::ApstraError;
use crate::models::*;
use std::collections::HashMap;

pub async fn get_all_blueprint_status(client: &MockApstraClient) -> Result<Vec<BlueprintStatus>, ApstraError> {
    let mut blueprints: Vec<BlueprintStatus> = lock(&client.blueprints).values().cloned().collect();
    blueprints.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(blueprints)
}

pub async fn get_blueprint_status(client: &MockApstraClient, id: &ObjectId) -> Result<BlueprintStatus, ApstraError> {
    lock(&client.blueprints)
        .get(id)
        .cloned()
        .ok_or_else(|| ApstraError::NotFound(format!("blueprint '{}' not found", id)))
}

pub async fn get_blueprint_status_by_name(client: &MockApstraClient, name: &str) -> Result<BlueprintStatus, ApstraError> {
    let blueprints = get_all_blueprint_status(client).await?;
    find_exactly_one(blueprints, "blueprint", name, |b| b.label == name)
}

pub async fn create_blueprint_from_template(
    client: &MockApstraClient,
    request: &CreateBlueprintFromTemplateRequest,
) -> Result<ObjectId, ApstraError> {
    let mut blueprints = lock(&client.blueprints);
    if blueprints.values().any(|b| b.label == request.label) {
        return Err(ApstraError::Conflict(format!("blueprint '{}' already exists", request.label)));
    }

    let id = new_object_id();
    blueprints.insert(
        id.clone(),
        BlueprintStatus {
            id: id.clone(),
            label: request.label.clone(),
            status: "created".to_string(),
            design: request.design.clone(),
            version: 1,
            has_uncommitted_changes: true,
            build_errors_count: 0,
            build_warnings_count: 0,
            anomaly_counts: serde_json::json!({}),
            last_modified_at: now(),
        },
    );
    Ok(id)
}

pub async fn delete_blueprint(client: &MockApstraClient, id: &ObjectId) -> Result<(), ApstraError> {
    if lock(&client.blueprints).remove(id).is_none() {
        return Err(ApstraError::NotFound(format!("blueprint '{}' not found", id)));
    }
    lock(&client.security_zones).remove(id);
    lock(&client.tasks).remove(id);
    Ok(())
}

fn require_blueprint(client: &MockApstraClient, id: &ObjectId) -> Result<(), ApstraError> {
    if lock(&client.blueprints).contains_key(id) {
        Ok(())
    } else {
        Err(ApstraError::NotFound(format!("blueprint '{}' not found", id)))
    }
}

fn bump_version(client: &MockApstraClient, id: &ObjectId) {
    if let Some(bp) = lock(&client.blueprints).get_mut(id) {
        bp.version += 1;
        bp.has_uncommitted_changes = true;
        bp.last_modified_at = now();
    }
}

fn record_task(client: &MockApstraClient, blueprint_id: &ObjectId, detail: TaskDetail) {
    lock(&client.tasks)
        .entry(blueprint_id.clone())
        .or_default()
        .insert(detail.id.clone(), detail);
}

pub async fn create_security_zone(
    client: &MockApstraClient,
    blueprint_id: &ObjectId,
    request: &SecurityZoneRequest,
) -> Result<ObjectId, ApstraError> {
    require_blueprint(client, blueprint_id)?;

    let id = {
        let mut zones = lock(&client.security_zones);
        let zones = zones.entry(blueprint_id.clone()).or_default();
        if zones.values().any(|z| z.label == request.label || z.vrf_name == request.vrf_name) {
            return Err(ApstraError::Conflict(format!(
                "security zone '{}' already exists in blueprint '{}'",
                request.label, blueprint_id
            )));
        }
        let id = new_object_id();
        zones.insert(
            id.clone(),
            SecurityZone {
                id: id.clone(),
                label: request.label.clone(),
                vrf_name: request.vrf_name.clone(),
                sz_type: request.sz_type.clone(),
                vni_id: request.vni_id,
                vlan_id: request.vlan_id,
                routing_policy_id: request.routing_policy_id.clone(),
            },
        );
        id
    };

    record_task(
        client,
        blueprint_id,
        succeeded_task(
            new_task_id(),
            format!("/api/blueprints/{}/security-zones", blueprint_id),
            "POST",
            serde_json::json!({ "id": id }),
        ),
    );
    bump_version(client, blueprint_id);
    Ok(id)
}

pub async fn get_security_zone(
    client: &MockApstraClient,
    blueprint_id: &ObjectId,
    id: &ObjectId,
) -> Result<SecurityZone, ApstraError> {
    lock(&client.security_zones)
        .get(blueprint_id)
        .and_then(|zones| zones.get(id))
        .cloned()
        .ok_or_else(|| {
            ApstraError::NotFound(format!("security zone '{}' not found in blueprint '{}'", id, blueprint_id))
        })
}

pub async fn get_all_security_zones(
    client: &MockApstraClient,
    blueprint_id: &ObjectId,
) -> Result<Vec<SecurityZone>, ApstraError> {
    require_blueprint(client, blueprint_id)?;
    let mut zones: Vec<SecurityZone> = lock(&client.security_zones)
        .get(blueprint_id)
        .map(|zones| zones.values().cloned().collect())
        .unwrap_or_default();
    zones.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(zones)
}

pub async fn delete_security_zone(
    client: &MockApstraClient,
    blueprint_id: &ObjectId,
    id: &ObjectId,
) -> Result<(), ApstraError> {
    let removed = lock(&client.security_zones)
        .get_mut(blueprint_id)
        .and_then(|zones| zones.remove(id));
    if removed.is_none() {
        return Err(ApstraError::NotFound(format!(
            "security zone '{}' not found in blueprint '{}'",
            id, blueprint_id
        )));
    }

    record_task(
        client,
        blueprint_id,
        succeeded_task(
            new_task_id(),
            format!("/api/blueprints/{}/security-zones/{}", blueprint_id, id),
            "DELETE",
            serde_json::Value::Null,
        ),
    );
    bump_version(client, blueprint_id);
    Ok(())
}

pub async fn wait_for_task_completion(
    client: &MockApstraClient,
    blueprint_id: &ObjectId,
    task_id: &TaskId,
) -> Result<TaskDetail, ApstraError> {
    if *lock(&client.shut_down) {
        return Err(ApstraError::TaskMonitor(format!(
            "shutting down; not accepting blueprint '{}' task '{}'",
            blueprint_id, task_id
        )));
    }

    let detail = lock(&client.tasks)
        .get(blueprint_id)
        .and_then(|tasks| tasks.get(task_id))
        .cloned()
        .ok_or_else(|| ApstraError::TaskUnknown {
            blueprint_id: blueprint_id.clone(),
            task_id: task_id.clone(),
        })?;

    let status = detail.task_status();
    if status.is_done() {
        Ok(detail)
    } else if status.is_pending() {
        // nothing advances tasks in memory
        Err(ApstraError::TaskMonitor(format!(
            "blueprint '{}' task '{}' still {} in mock",
            blueprint_id, task_id, status
        )))
    } else {
        Err(ApstraError::TaskStatusUnexpected {
            blueprint_id: blueprint_id.clone(),
            task_id: task_id.clone(),
            status: detail.status,
        })
    }
}

pub async fn get_blueprint_tasks_status(
    client: &MockApstraClient,
    blueprint_id: &ObjectId,
    task_ids: &[TaskId],
) -> Result<HashMap<TaskId, String>, ApstraError> {
    let tasks = lock(&client.tasks);
    let Some(known) = tasks.get(blueprint_id) else {
        return Ok(HashMap::new());
    };
    Ok(known
        .values()
        .filter(|t| task_ids.is_empty() || task_ids.contains(&t.id))
        .map(|t| (t.id.clone(), t.status.clone()))
        .collect())
}

pub async fn get_blueprint_task(
    client: &MockApstraClient,
    blueprint_id: &ObjectId,
    task_id: &TaskId,
) -> Result<TaskDetail, ApstraError> {
    lock(&client.tasks)
        .get(blueprint_id)
        .and_then(|tasks| tasks.get(task_id))
        .cloned()
        .ok_or_else(|| ApstraError::NotFound(format!("blueprint '{}' task '{}' not found", blueprint_id, task_id)))
}
