//! Design operations for MockApstraClient
//!
//! Handles design tags

use super::MockApstraClient;
use super::helpers::{lock, new_object_id, now};
use crate::common::query::find_exactly_one;
use crate::error::ApstraError;
use crate::models::*;

pub async fn get_all_design_tags(client: &MockApstraClient) -> Result<Vec<DesignTag>, ApstraError> {
    let mut tags: Vec<DesignTag> = lock(&client.design_tags).values().cloned().collect();
    tags.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(tags)
}

pub async fn get_design_tag(client: &MockApstraClient, id: &ObjectId) -> Result<DesignTag, ApstraError> {
    lock(&client.design_tags)
        .get(id)
        .cloned()
        .ok_or_else(|| ApstraError::NotFound(format!("design tag '{}' not found", id)))
}

pub async fn get_design_tag_by_label(client: &MockApstraClient, label: &str) -> Result<DesignTag, ApstraError> {
    let tags = get_all_design_tags(client).await?;
    find_exactly_one(tags, "design tag", label, |t| t.label == label)
}

pub async fn create_design_tag(client: &MockApstraClient, request: &DesignTagRequest) -> Result<ObjectId, ApstraError> {
    let mut tags = lock(&client.design_tags);
    // labels are unique, case-insensitively
    if tags.values().any(|t| t.label.eq_ignore_ascii_case(&request.label)) {
        return Err(ApstraError::Conflict(format!("design tag '{}' already exists", request.label)));
    }

    let id = new_object_id();
    let now = now();
    tags.insert(
        id.clone(),
        DesignTag {
            id: id.clone(),
            label: request.label.clone(),
            description: request.description.clone(),
            created_at: now.clone(),
            last_modified_at: now,
        },
    );
    Ok(id)
}

pub async fn update_design_tag(
    client: &MockApstraClient,
    id: &ObjectId,
    request: &DesignTagRequest,
) -> Result<(), ApstraError> {
    let mut tags = lock(&client.design_tags);
    let tag = tags
        .get_mut(id)
        .ok_or_else(|| ApstraError::NotFound(format!("design tag '{}' not found", id)))?;
    tag.label = request.label.clone();
    tag.description = request.description.clone();
    tag.last_modified_at = now();
    Ok(())
}

pub async fn delete_design_tag(client: &MockApstraClient, id: &ObjectId) -> Result<(), ApstraError> {
    lock(&client.design_tags)
        .remove(id)
        .map(|_| ())
        .ok_or_else(|| ApstraError::NotFound(format!("design tag '{}' not found", id)))
}
