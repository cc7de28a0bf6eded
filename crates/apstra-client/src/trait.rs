//! ApstraClient trait for mocking
//!
//! This trait abstracts the ApstraClient to enable mocking in unit tests.
//! The concrete ApstraClient implements this trait, and tests can use mock implementations.

use crate::error::ApstraError;
use crate::models::*;
use std::collections::HashMap;

/// Trait for Apstra API client operations
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait ApstraClientTrait: Send + Sync {
    /// Get the base URL
    fn base_url(&self) -> &str;

    async fn login(&self) -> Result<(), ApstraError>;
    async fn logout(&self) -> Result<(), ApstraError>;

    /// Stop background work once outstanding task waits resolve
    async fn shutdown(&self);

    async fn get_version(&self) -> Result<VersionResponse, ApstraError>;

    // Blueprints
    async fn list_blueprint_ids(&self) -> Result<Vec<ObjectId>, ApstraError>;
    async fn get_all_blueprint_status(&self) -> Result<Vec<BlueprintStatus>, ApstraError>;
    async fn get_blueprint_status(&self, id: &ObjectId) -> Result<BlueprintStatus, ApstraError>;
    async fn get_blueprint_status_by_name(&self, name: &str) -> Result<BlueprintStatus, ApstraError>;
    async fn create_blueprint_from_template(&self, request: &CreateBlueprintFromTemplateRequest) -> Result<ObjectId, ApstraError>;
    async fn delete_blueprint(&self, id: &ObjectId) -> Result<(), ApstraError>;

    // Design tags
    async fn list_design_tag_ids(&self) -> Result<Vec<ObjectId>, ApstraError>;
    async fn get_all_design_tags(&self) -> Result<Vec<DesignTag>, ApstraError>;
    async fn get_design_tag(&self, id: &ObjectId) -> Result<DesignTag, ApstraError>;
    async fn get_design_tag_by_label(&self, label: &str) -> Result<DesignTag, ApstraError>;
    async fn create_design_tag(&self, request: &DesignTagRequest) -> Result<ObjectId, ApstraError>;
    async fn update_design_tag(&self, id: &ObjectId, request: &DesignTagRequest) -> Result<(), ApstraError>;
    async fn delete_design_tag(&self, id: &ObjectId) -> Result<(), ApstraError>;

    // ASN pools
    async fn list_asn_pool_ids(&self) -> Result<Vec<ObjectId>, ApstraError>;
    async fn get_asn_pools(&self) -> Result<Vec<AsnPool>, ApstraError>;
    async fn get_asn_pool(&self, id: &ObjectId) -> Result<AsnPool, ApstraError>;
    async fn get_asn_pool_by_name(&self, name: &str) -> Result<AsnPool, ApstraError>;
    async fn create_asn_pool(&self, request: &AsnPoolRequest) -> Result<ObjectId, ApstraError>;
    async fn update_asn_pool(&self, id: &ObjectId, request: &AsnPoolRequest) -> Result<(), ApstraError>;
    async fn delete_asn_pool(&self, id: &ObjectId) -> Result<(), ApstraError>;

    // IPv4 pools
    async fn list_ip4_pool_ids(&self) -> Result<Vec<ObjectId>, ApstraError>;
    async fn get_ip4_pools(&self) -> Result<Vec<IpPool>, ApstraError>;
    async fn get_ip4_pool(&self, id: &ObjectId) -> Result<IpPool, ApstraError>;
    async fn get_ip4_pool_by_name(&self, name: &str) -> Result<IpPool, ApstraError>;
    async fn create_ip4_pool(&self, request: &IpPoolRequest) -> Result<ObjectId, ApstraError>;
    async fn update_ip4_pool(&self, id: &ObjectId, request: &IpPoolRequest) -> Result<(), ApstraError>;
    async fn delete_ip4_pool(&self, id: &ObjectId) -> Result<(), ApstraError>;

    // IPv6 pools
    async fn list_ip6_pool_ids(&self) -> Result<Vec<ObjectId>, ApstraError>;
    async fn get_ip6_pools(&self) -> Result<Vec<IpPool>, ApstraError>;
    async fn get_ip6_pool(&self, id: &ObjectId) -> Result<IpPool, ApstraError>;
    async fn get_ip6_pool_by_name(&self, name: &str) -> Result<IpPool, ApstraError>;
    async fn create_ip6_pool(&self, request: &IpPoolRequest) -> Result<ObjectId, ApstraError>;
    async fn update_ip6_pool(&self, id: &ObjectId, request: &IpPoolRequest) -> Result<(), ApstraError>;
    async fn delete_ip6_pool(&self, id: &ObjectId) -> Result<(), ApstraError>;

    // Security zones (create/delete are task-monitored)
    async fn create_security_zone(&self, blueprint_id: &ObjectId, request: &SecurityZoneRequest) -> Result<ObjectId, ApstraError>;
    async fn get_security_zone(&self, blueprint_id: &ObjectId, id: &ObjectId) -> Result<SecurityZone, ApstraError>;
    async fn get_all_security_zones(&self, blueprint_id: &ObjectId) -> Result<Vec<SecurityZone>, ApstraError>;
    async fn delete_security_zone(&self, blueprint_id: &ObjectId, id: &ObjectId) -> Result<(), ApstraError>;

    // Tasks
    async fn wait_for_task_completion(&self, blueprint_id: &ObjectId, task_id: &TaskId) -> Result<TaskDetail, ApstraError>;
    async fn get_blueprint_tasks_status(&self, blueprint_id: &ObjectId, task_ids: &[TaskId]) -> Result<HashMap<TaskId, String>, ApstraError>;
    async fn get_blueprint_task(&self, blueprint_id: &ObjectId, task_id: &TaskId) -> Result<TaskDetail, ApstraError>;
}
