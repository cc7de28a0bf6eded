//! Mock ApstraClient for unit testing
//!
//! This module provides a mock implementation of ApstraClientTrait that can be used
//! in unit tests without requiring a running Apstra server.
//!
//! The mock is organized into domain-specific modules:
//! - `blueprints.rs` - blueprints, security zones and their tasks
//! - `design.rs` - design tags
//! - `resources.rs` - ASN and IP pools
//! - `helpers.rs` - id/timestamp generation and model builders
//!
//! Blueprint mutations that the real client runs asynchronously complete
//! immediately and leave a `succeeded` task record behind.

mod blueprints;
mod design;
mod helpers;
mod resources;

use crate::apstra_trait::ApstraClientTrait;
use crate::error::ApstraError;
use crate::models::*;
use helpers::lock;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Address family of an IP pool store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IpFamily {
    V4,
    V6,
}

impl IpFamily {
    pub(crate) fn address_bits(self) -> u32 {
        match self {
            IpFamily::V4 => 32,
            IpFamily::V6 => 128,
        }
    }
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpFamily::V4 => f.write_str("IPv4"),
            IpFamily::V6 => f.write_str("IPv6"),
        }
    }
}

type Store<K, V> = Arc<Mutex<HashMap<K, V>>>;

/// Mock ApstraClient for testing
///
/// This mock stores resources in memory and can be seeded with specific
/// records for testing different scenarios.
#[derive(Clone)]
pub struct MockApstraClient {
    pub(crate) base_url: String,
    pub(crate) version: Arc<Mutex<VersionResponse>>,
    pub(crate) logged_in: Arc<Mutex<bool>>,
    pub(crate) shut_down: Arc<Mutex<bool>>,
    // In-memory storage for resources
    pub(crate) blueprints: Store<ObjectId, BlueprintStatus>,
    pub(crate) design_tags: Store<ObjectId, DesignTag>,
    pub(crate) asn_pools: Store<ObjectId, AsnPool>,
    pub(crate) ip4_pools: Store<ObjectId, IpPool>,
    pub(crate) ip6_pools: Store<ObjectId, IpPool>,
    pub(crate) security_zones: Store<ObjectId, HashMap<ObjectId, SecurityZone>>,
    pub(crate) tasks: Store<ObjectId, HashMap<TaskId, TaskDetail>>,
}

impl MockApstraClient {
    /// Create a new mock client reporting the newest supported version
    pub fn new(base_url: impl Into<String>) -> Self {
        let version = crate::client::SUPPORTED_API_VERSIONS
            .last()
            .copied()
            .unwrap_or_default()
            .to_string();
        let mut parts = version.split('.');
        Self {
            base_url: base_url.into(),
            version: Arc::new(Mutex::new(VersionResponse {
                major: parts.next().unwrap_or_default().to_string(),
                minor: parts.next().unwrap_or_default().to_string(),
                build: format!("{}-mock", version),
                version,
            })),
            logged_in: Arc::new(Mutex::new(false)),
            shut_down: Arc::new(Mutex::new(false)),
            blueprints: Arc::new(Mutex::new(HashMap::new())),
            design_tags: Arc::new(Mutex::new(HashMap::new())),
            asn_pools: Arc::new(Mutex::new(HashMap::new())),
            ip4_pools: Arc::new(Mutex::new(HashMap::new())),
            ip6_pools: Arc::new(Mutex::new(HashMap::new())),
            security_zones: Arc::new(Mutex::new(HashMap::new())),
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Override the reported server version (for test setup)
    pub fn set_version(&self, version: VersionResponse) {
        *lock(&self.version) = version;
    }

    /// Add a blueprint to the mock store (for test setup)
    pub fn add_blueprint(&self, blueprint: BlueprintStatus) {
        lock(&self.blueprints).insert(blueprint.id.clone(), blueprint);
    }

    /// Add a design tag to the mock store (for test setup)
    pub fn add_design_tag(&self, tag: DesignTag) {
        lock(&self.design_tags).insert(tag.id.clone(), tag);
    }

    /// Add an ASN pool to the mock store (for test setup)
    pub fn add_asn_pool(&self, pool: AsnPool) {
        lock(&self.asn_pools).insert(pool.id.clone(), pool);
    }

    /// Add an IPv4 pool to the mock store (for test setup)
    pub fn add_ip4_pool(&self, pool: IpPool) {
        lock(&self.ip4_pools).insert(pool.id.clone(), pool);
    }

    /// Add an IPv6 pool to the mock store (for test setup)
    pub fn add_ip6_pool(&self, pool: IpPool) {
        lock(&self.ip6_pools).insert(pool.id.clone(), pool);
    }

    /// Add a security zone to a blueprint (for test setup)
    pub fn add_security_zone(&self, blueprint_id: &ObjectId, zone: SecurityZone) {
        lock(&self.security_zones)
            .entry(blueprint_id.clone())
            .or_default()
            .insert(zone.id.clone(), zone);
    }

    /// Add or replace a task record (for test setup)
    pub fn add_task(&self, blueprint_id: &ObjectId, task: TaskDetail) {
        lock(&self.tasks)
            .entry(blueprint_id.clone())
            .or_default()
            .insert(task.id.clone(), task);
    }

    /// Task records of one blueprint, oldest first
    pub fn tasks_for_blueprint(&self, blueprint_id: &ObjectId) -> Vec<TaskDetail> {
        let mut tasks: Vec<TaskDetail> = lock(&self.tasks)
            .get(blueprint_id)
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        tasks
    }

    /// True after `login` until `logout`
    pub fn is_logged_in(&self) -> bool {
        *lock(&self.logged_in)
    }

    /// True after `shutdown`
    pub fn is_shut_down(&self) -> bool {
        *lock(&self.shut_down)
    }

    pub(crate) fn ip_store(&self, family: IpFamily) -> &Mutex<HashMap<ObjectId, IpPool>> {
        match family {
            IpFamily::V4 => &*self.ip4_pools,
            IpFamily::V6 => &*self.ip6_pools,
        }
    }
}

#[async_trait::async_trait]
impl ApstraClientTrait for MockApstraClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn login(&self) -> Result<(), ApstraError> {
        *lock(&self.logged_in) = true;
        Ok(())
    }

    async fn logout(&self) -> Result<(), ApstraError> {
        *lock(&self.logged_in) = false;
        Ok(())
    }

    async fn shutdown(&self) {
        *lock(&self.shut_down) = true;
    }

    async fn get_version(&self) -> Result<VersionResponse, ApstraError> {
        Ok(lock(&self.version).clone())
    }

    // Blueprints - delegated to blueprints module
    async fn list_blueprint_ids(&self) -> Result<Vec<ObjectId>, ApstraError> {
        Ok(blueprints::get_all_blueprint_status(self).await?.into_iter().map(|b| b.id).collect())
    }

    async fn get_all_blueprint_status(&self) -> Result<Vec<BlueprintStatus>, ApstraError> {
        blueprints::get_all_blueprint_status(self).await
    }

    async fn get_blueprint_status(&self, id: &ObjectId) -> Result<BlueprintStatus, ApstraError> {
        blueprints::get_blueprint_status(self, id).await
    }

    async fn get_blueprint_status_by_name(&self, name: &str) -> Result<BlueprintStatus, ApstraError> {
        blueprints::get_blueprint_status_by_name(self, name).await
    }

    async fn create_blueprint_from_template(
        &self,
        request: &CreateBlueprintFromTemplateRequest,
    ) -> Result<ObjectId, ApstraError> {
        blueprints::create_blueprint_from_template(self, request).await
    }

    async fn delete_blueprint(&self, id: &ObjectId) -> Result<(), ApstraError> {
        blueprints::delete_blueprint(self, id).await
    }

    // Design tags - delegated to design module
    async fn list_design_tag_ids(&self) -> Result<Vec<ObjectId>, ApstraError> {
        Ok(design::get_all_design_tags(self).await?.into_iter().map(|t| t.id).collect())
    }

    async fn get_all_design_tags(&self) -> Result<Vec<DesignTag>, ApstraError> {
        design::get_all_design_tags(self).await
    }

    async fn get_design_tag(&self, id: &ObjectId) -> Result<DesignTag, ApstraError> {
        design::get_design_tag(self, id).await
    }

    async fn get_design_tag_by_label(&self, label: &str) -> Result<DesignTag, ApstraError> {
        design::get_design_tag_by_label(self, label).await
    }

    async fn create_design_tag(&self, request: &DesignTagRequest) -> Result<ObjectId, ApstraError> {
        design::create_design_tag(self, request).await
    }

    async fn update_design_tag(&self, id: &ObjectId, request: &DesignTagRequest) -> Result<(), ApstraError> {
        design::update_design_tag(self, id, request).await
    }

    async fn delete_design_tag(&self, id: &ObjectId) -> Result<(), ApstraError> {
        design::delete_design_tag(self, id).await
    }

    // ASN pools - delegated to resources module
    async fn list_asn_pool_ids(&self) -> Result<Vec<ObjectId>, ApstraError> {
        Ok(resources::get_asn_pools(self).await?.into_iter().map(|p| p.id).collect())
    }

    async fn get_asn_pools(&self) -> Result<Vec<AsnPool>, ApstraError> {
        resources::get_asn_pools(self).await
    }

    async fn get_asn_pool(&self, id: &ObjectId) -> Result<AsnPool, ApstraError> {
        resources::get_asn_pool(self, id).await
    }

    async fn get_asn_pool_by_name(&self, name: &str) -> Result<AsnPool, ApstraError> {
        resources::get_asn_pool_by_name(self, name).await
    }

    async fn create_asn_pool(&self, request: &AsnPoolRequest) -> Result<ObjectId, ApstraError> {
        resources::create_asn_pool(self, request).await
    }

    async fn update_asn_pool(&self, id: &ObjectId, request: &AsnPoolRequest) -> Result<(), ApstraError> {
        resources::update_asn_pool(self, id, request).await
    }

    async fn delete_asn_pool(&self, id: &ObjectId) -> Result<(), ApstraError> {
        resources::delete_asn_pool(self, id).await
    }

    // IPv4 pools
    async fn list_ip4_pool_ids(&self) -> Result<Vec<ObjectId>, ApstraError> {
        Ok(resources::get_ip_pools(self, IpFamily::V4).await?.into_iter().map(|p| p.id).collect())
    }

    async fn get_ip4_pools(&self) -> Result<Vec<IpPool>, ApstraError> {
        resources::get_ip_pools(self, IpFamily::V4).await
    }

    async fn get_ip4_pool(&self, id: &ObjectId) -> Result<IpPool, ApstraError> {
        resources::get_ip_pool(self, IpFamily::V4, id).await
    }

    async fn get_ip4_pool_by_name(&self, name: &str) -> Result<IpPool, ApstraError> {
        resources::get_ip_pool_by_name(self, IpFamily::V4, name).await
    }

    async fn create_ip4_pool(&self, request: &IpPoolRequest) -> Result<ObjectId, ApstraError> {
        resources::create_ip_pool(self, IpFamily::V4, request).await
    }

    async fn update_ip4_pool(&self, id: &ObjectId, request: &IpPoolRequest) -> Result<(), ApstraError> {
        resources::update_ip_pool(self, IpFamily::V4, id, request).await
    }

    async fn delete_ip4_pool(&self, id: &ObjectId) -> Result<(), ApstraError> {
        resources::delete_ip_pool(self, IpFamily::V4, id).await
    }

    // IPv6 pools
    async fn list_ip6_pool_ids(&self) -> Result<Vec<ObjectId>, ApstraError> {
        Ok(resources::get_ip_pools(self, IpFamily::V6).await?.into_iter().map(|p| p.id).collect())
    }

    async fn get_ip6_pools(&self) -> Result<Vec<IpPool>, ApstraError> {
        resources::get_ip_pools(self, IpFamily::V6).await
    }

    async fn get_ip6_pool(&self, id: &ObjectId) -> Result<IpPool, ApstraError> {
        resources::get_ip_pool(self, IpFamily::V6, id).await
    }

    async fn get_ip6_pool_by_name(&self, name: &str) -> Result<IpPool, ApstraError> {
        resources::get_ip_pool_by_name(self, IpFamily::V6, name).await
    }

    async fn create_ip6_pool(&self, request: &IpPoolRequest) -> Result<ObjectId, ApstraError> {
        resources::create_ip_pool(self, IpFamily::V6, request).await
    }

    async fn update_ip6_pool(&self, id: &ObjectId, request: &IpPoolRequest) -> Result<(), ApstraError> {
        resources::update_ip_pool(self, IpFamily::V6, id, request).await
    }

    async fn delete_ip6_pool(&self, id: &ObjectId) -> Result<(), ApstraError> {
        resources::delete_ip_pool(self, IpFamily::V6, id).await
    }

    // Security zones - delegated to blueprints module
    async fn create_security_zone(
        &self,
        blueprint_id: &ObjectId,
        request: &SecurityZoneRequest,
    ) -> Result<ObjectId, ApstraError> {
        blueprints::create_security_zone(self, blueprint_id, request).await
    }

    async fn get_security_zone(&self, blueprint_id: &ObjectId, id: &ObjectId) -> Result<SecurityZone, ApstraError> {
        blueprints::get_security_zone(self, blueprint_id, id).await
    }

    async fn get_all_security_zones(&self, blueprint_id: &ObjectId) -> Result<Vec<SecurityZone>, ApstraError> {
        blueprints::get_all_security_zones(self, blueprint_id).await
    }

    async fn delete_security_zone(&self, blueprint_id: &ObjectId, id: &ObjectId) -> Result<(), ApstraError> {
        blueprints::delete_security_zone(self, blueprint_id, id).await
    }

    // Tasks
    async fn wait_for_task_completion(
        &self,
        blueprint_id: &ObjectId,
        task_id: &TaskId,
    ) -> Result<TaskDetail, ApstraError> {
        blueprints::wait_for_task_completion(self, blueprint_id, task_id).await
    }

    async fn get_blueprint_tasks_status(
        &self,
        blueprint_id: &ObjectId,
        task_ids: &[TaskId],
    ) -> Result<HashMap<TaskId, String>, ApstraError> {
        blueprints::get_blueprint_tasks_status(self, blueprint_id, task_ids).await
    }

    async fn get_blueprint_task(&self, blueprint_id: &ObjectId, task_id: &TaskId) -> Result<TaskDetail, ApstraError> {
        blueprints::get_blueprint_task(self, blueprint_id, task_id).await
    }
}
