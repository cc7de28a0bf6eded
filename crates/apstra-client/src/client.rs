//! Apstra API client
//!
//! Implements the Apstra REST API client for blueprint, design and resource
//! pool operations. Blueprint-scoped mutations are submitted with
//! `async=full` and resolved through the background task monitor.

use crate::apstra_trait::ApstraClientTrait;
use crate::common::query::{find_exactly_one, query_items};
use crate::common::{HttpClient, decode};
use crate::config::ClientConfig;
use crate::error::ApstraError;
use crate::models::*;
use crate::task_monitor::{TaskMonitorHandle, TaskMonitorShutdown, TaskStatusSource, spawn_task_monitor};
use reqwest::Method;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Server version endpoint
pub const API_URL_VERSION: &str = "/api/version";
/// Blueprint collection
pub const API_URL_BLUEPRINTS: &str = "/api/blueprints";
/// Design tag collection
pub const API_URL_DESIGN_TAGS: &str = "/api/design/tags";
/// ASN pool collection
pub const API_URL_ASN_POOLS: &str = "/api/resources/asn-pools";
/// IPv4 pool collection
pub const API_URL_IPV4_POOLS: &str = "/api/resources/ip-pools";
/// IPv6 pool collection
pub const API_URL_IPV6_POOLS: &str = "/api/resources/ipv6-pools";

/// Server API versions this client is known to work with
pub const SUPPORTED_API_VERSIONS: &[&str] = &["4.1.0", "4.1.1", "4.1.2", "4.2.0", "4.2.1"];

const BLUEPRINTS_PREFIX: &str = "/api/blueprints/";
const ASYNC_QUERY: (&str, &str) = ("async", "full");

/// Apstra API client
pub struct ApstraClient {
    http: Arc<HttpClient>,
    server_version: VersionResponse,
    monitor: TaskMonitorHandle,
    monitor_shutdown: Mutex<TaskMonitorShutdown>,
}

impl ApstraClient {
    /// Create a new Apstra client
    ///
    /// Validates the configuration, checks the server's API version and
    /// starts the task monitor. Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// * `InvalidConfig` - missing url/user/pass
    /// * `UnsupportedVersion` - server version outside [`SUPPORTED_API_VERSIONS`]
    ///   and `experimental` not set
    pub async fn new(cfg: ClientConfig) -> Result<Self, ApstraError> {
        cfg.validate()?;
        let http = Arc::new(HttpClient::new(&cfg)?);

        let server_version: VersionResponse = http.get(API_URL_VERSION, &[]).await?;
        check_api_version(&server_version.version, cfg.experimental)?;

        let (monitor, monitor_shutdown) =
            spawn_task_monitor(Arc::clone(&http), cfg.task_monitor.clone(), cfg.error_sink.clone());

        info!(
            url = %http.base_url(),
            version = %server_version.version,
            "Apstra client created"
        );

        Ok(Self {
            http,
            server_version,
            monitor,
            monitor_shutdown: Mutex::new(monitor_shutdown),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Version reported by the server when the client was created
    pub fn server_version(&self) -> &VersionResponse {
        &self.server_version
    }

    /// Log in explicitly. Optional: any request answered with 401 logs in
    /// and retries on its own.
    pub async fn login(&self) -> Result<(), ApstraError> {
        self.http.login().await
    }

    /// Invalidate the held auth token
    pub async fn logout(&self) -> Result<(), ApstraError> {
        self.http.logout().await
    }

    /// Stop the task monitor once every outstanding wait has resolved
    pub async fn shutdown(&self) {
        info!("Apstra client shutdown requested");
        self.monitor_shutdown.lock().await.shutdown().await;
    }

    /// Submit a blueprint-scoped request with `async=full` and wait for the
    /// resulting task. A synchronous answer is decoded as-is.
    async fn talk_async<T: for<'de> Deserialize<'de>>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, ApstraError> {
        let text = self.http.request_text(method, path, &[ASYNC_QUERY], body).await?;

        let Some(envelope) = TaskIdResponse::parse(&text) else {
            debug!("{} answered synchronously", path);
            return decode_or_null(path, &text);
        };

        let blueprint_id = blueprint_id_from_path(path).ok_or_else(|| {
            ApstraError::InvalidRequest(format!(
                "cannot wait for task '{}': no blueprint id in '{}'",
                envelope.task_id, path
            ))
        })?;

        let detail = self
            .monitor
            .wait_for_task_completion(blueprint_id.clone(), envelope.task_id.clone())
            .await?;

        match detail.task_status() {
            TaskStatus::Succeeded => {
                serde_json::from_value(detail.detailed_status.api_response).map_err(|e| ApstraError::Decode {
                    url: path.to_string(),
                    message: format!("task '{}' api_response - {}", envelope.task_id, e),
                })
            }
            status => Err(ApstraError::TaskFailed {
                blueprint_id,
                task_id: envelope.task_id,
                status: status.to_string(),
                errors: detail.detailed_status.errors,
            }),
        }
    }

    // Version

    /// Query the server version
    pub async fn get_version(&self) -> Result<VersionResponse, ApstraError> {
        self.http.get(API_URL_VERSION, &[]).await
    }

    // Blueprints

    /// Ids of every blueprint
    pub async fn list_blueprint_ids(&self) -> Result<Vec<ObjectId>, ApstraError> {
        let blueprints = self.get_all_blueprint_status().await?;
        Ok(blueprints.into_iter().map(|b| b.id).collect())
    }

    /// Status summary of every blueprint
    pub async fn get_all_blueprint_status(&self) -> Result<Vec<BlueprintStatus>, ApstraError> {
        query_items(&self.http, API_URL_BLUEPRINTS, &[]).await
    }

    /// Status summary of one blueprint
    pub async fn get_blueprint_status(&self, id: &ObjectId) -> Result<BlueprintStatus, ApstraError> {
        let blueprints = self.get_all_blueprint_status().await?;
        find_exactly_one(blueprints, "blueprint", id.as_str(), |b| &b.id == id)
    }

    /// Status summary of the blueprint with this label
    pub async fn get_blueprint_status_by_name(&self, name: &str) -> Result<BlueprintStatus, ApstraError> {
        let blueprints = self.get_all_blueprint_status().await?;
        find_exactly_one(blueprints, "blueprint", name, |b| b.label == name)
    }

    /// Instantiate a blueprint from a template
    pub async fn create_blueprint_from_template(
        &self,
        request: &CreateBlueprintFromTemplateRequest,
    ) -> Result<ObjectId, ApstraError> {
        let body = serde_json::to_value(request)?;
        let response: ObjectIdResponse = self.http.post(API_URL_BLUEPRINTS, &body).await?;
        info!(blueprint_id = %response.id, label = %request.label, "Created blueprint");
        Ok(response.id)
    }

    /// Delete a blueprint
    pub async fn delete_blueprint(&self, id: &ObjectId) -> Result<(), ApstraError> {
        self.http.delete(&format!("{}/{}", API_URL_BLUEPRINTS, id)).await?;
        info!(blueprint_id = %id, "Deleted blueprint");
        Ok(())
    }

    // Design tags

    /// Ids of every design tag
    pub async fn list_design_tag_ids(&self) -> Result<Vec<ObjectId>, ApstraError> {
        Ok(self.get_all_design_tags().await?.into_iter().map(|t| t.id).collect())
    }

    /// Every design tag
    pub async fn get_all_design_tags(&self) -> Result<Vec<DesignTag>, ApstraError> {
        query_items(&self.http, API_URL_DESIGN_TAGS, &[]).await
    }

    /// One design tag
    pub async fn get_design_tag(&self, id: &ObjectId) -> Result<DesignTag, ApstraError> {
        self.http.get(&format!("{}/{}", API_URL_DESIGN_TAGS, id), &[]).await
    }

    /// The design tag with this label
    pub async fn get_design_tag_by_label(&self, label: &str) -> Result<DesignTag, ApstraError> {
        let tags = self.get_all_design_tags().await?;
        find_exactly_one(tags, "design tag", label, |t| t.label == label)
    }

    /// Create a design tag
    pub async fn create_design_tag(&self, request: &DesignTagRequest) -> Result<ObjectId, ApstraError> {
        let body = serde_json::to_value(request)?;
        let response: ObjectIdResponse = self.http.post(API_URL_DESIGN_TAGS, &body).await?;
        debug!(id = %response.id, label = %request.label, "Created design tag");
        Ok(response.id)
    }

    /// Replace a design tag
    pub async fn update_design_tag(&self, id: &ObjectId, request: &DesignTagRequest) -> Result<(), ApstraError> {
        let body = serde_json::to_value(request)?;
        self.http.put(&format!("{}/{}", API_URL_DESIGN_TAGS, id), &body).await
    }

    /// Delete a design tag
    pub async fn delete_design_tag(&self, id: &ObjectId) -> Result<(), ApstraError> {
        self.http.delete(&format!("{}/{}", API_URL_DESIGN_TAGS, id)).await
    }

    // ASN pools

    /// Ids of every ASN pool
    pub async fn list_asn_pool_ids(&self) -> Result<Vec<ObjectId>, ApstraError> {
        Ok(self.get_asn_pools().await?.into_iter().map(|p| p.id).collect())
    }

    /// Every ASN pool
    pub async fn get_asn_pools(&self) -> Result<Vec<AsnPool>, ApstraError> {
        query_items(&self.http, API_URL_ASN_POOLS, &[]).await
    }

    /// One ASN pool
    pub async fn get_asn_pool(&self, id: &ObjectId) -> Result<AsnPool, ApstraError> {
        self.http.get(&format!("{}/{}", API_URL_ASN_POOLS, id), &[]).await
    }

    /// The ASN pool with this display name
    pub async fn get_asn_pool_by_name(&self, name: &str) -> Result<AsnPool, ApstraError> {
        let pools = self.get_asn_pools().await?;
        find_exactly_one(pools, "ASN pool", name, |p| p.display_name == name)
    }

    /// Create an ASN pool
    pub async fn create_asn_pool(&self, request: &AsnPoolRequest) -> Result<ObjectId, ApstraError> {
        validate_asn_ranges(&request.ranges)?;
        let body = serde_json::to_value(request)?;
        let response: ObjectIdResponse = self.http.post(API_URL_ASN_POOLS, &body).await?;
        debug!(id = %response.id, name = %request.display_name, "Created ASN pool");
        Ok(response.id)
    }

    /// Replace an ASN pool
    pub async fn update_asn_pool(&self, id: &ObjectId, request: &AsnPoolRequest) -> Result<(), ApstraError> {
        validate_asn_ranges(&request.ranges)?;
        let body = serde_json::to_value(request)?;
        self.http.put(&format!("{}/{}", API_URL_ASN_POOLS, id), &body).await
    }

    /// Delete an ASN pool
    pub async fn delete_asn_pool(&self, id: &ObjectId) -> Result<(), ApstraError> {
        self.http.delete(&format!("{}/{}", API_URL_ASN_POOLS, id)).await
    }

    // IP pools

    async fn list_ip_pool_ids(&self, collection: &str) -> Result<Vec<ObjectId>, ApstraError> {
        Ok(self.get_ip_pools(collection).await?.into_iter().map(|p| p.id).collect())
    }

    async fn get_ip_pools(&self, collection: &str) -> Result<Vec<IpPool>, ApstraError> {
        query_items(&self.http, collection, &[]).await
    }

    async fn get_ip_pool(&self, collection: &str, id: &ObjectId) -> Result<IpPool, ApstraError> {
        self.http.get(&format!("{}/{}", collection, id), &[]).await
    }

    async fn get_ip_pool_by_name(&self, collection: &str, name: &str) -> Result<IpPool, ApstraError> {
        let pools = self.get_ip_pools(collection).await?;
        find_exactly_one(pools, "IP pool", name, |p| p.display_name == name)
    }

    async fn create_ip_pool(&self, collection: &str, request: &IpPoolRequest) -> Result<ObjectId, ApstraError> {
        let body = serde_json::to_value(request)?;
        let response: ObjectIdResponse = self.http.post(collection, &body).await?;
        debug!(id = %response.id, name = %request.display_name, "Created IP pool");
        Ok(response.id)
    }

    async fn update_ip_pool(&self, collection: &str, id: &ObjectId, request: &IpPoolRequest) -> Result<(), ApstraError> {
        let body = serde_json::to_value(request)?;
        self.http.put(&format!("{}/{}", collection, id), &body).await
    }

    async fn delete_ip_pool(&self, collection: &str, id: &ObjectId) -> Result<(), ApstraError> {
        self.http.delete(&format!("{}/{}", collection, id)).await
    }

    /// Ids of every IPv4 pool
    pub async fn list_ip4_pool_ids(&self) -> Result<Vec<ObjectId>, ApstraError> {
        self.list_ip_pool_ids(API_URL_IPV4_POOLS).await
    }

    /// Every IPv4 pool
    pub async fn get_ip4_pools(&self) -> Result<Vec<IpPool>, ApstraError> {
        self.get_ip_pools(API_URL_IPV4_POOLS).await
    }

    /// One IPv4 pool
    pub async fn get_ip4_pool(&self, id: &ObjectId) -> Result<IpPool, ApstraError> {
        self.get_ip_pool(API_URL_IPV4_POOLS, id).await
    }

    /// The IPv4 pool with this display name
    pub async fn get_ip4_pool_by_name(&self, name: &str) -> Result<IpPool, ApstraError> {
        self.get_ip_pool_by_name(API_URL_IPV4_POOLS, name).await
    }

    /// Create an IPv4 pool
    pub async fn create_ip4_pool(&self, request: &IpPoolRequest) -> Result<ObjectId, ApstraError> {
        self.create_ip_pool(API_URL_IPV4_POOLS, request).await
    }

    /// Replace an IPv4 pool
    pub async fn update_ip4_pool(&self, id: &ObjectId, request: &IpPoolRequest) -> Result<(), ApstraError> {
        self.update_ip_pool(API_URL_IPV4_POOLS, id, request).await
    }

    /// Delete an IPv4 pool
    pub async fn delete_ip4_pool(&self, id: &ObjectId) -> Result<(), ApstraError> {
        self.delete_ip_pool(API_URL_IPV4_POOLS, id).await
    }

    /// Ids of every IPv6 pool
    pub async fn list_ip6_pool_ids(&self) -> Result<Vec<ObjectId>, ApstraError> {
        self.list_ip_pool_ids(API_URL_IPV6_POOLS).await
    }

    /// Every IPv6 pool
    pub async fn get_ip6_pools(&self) -> Result<Vec<IpPool>, ApstraError> {
        self.get_ip_pools(API_URL_IPV6_POOLS).await
    }

    /// One IPv6 pool
    pub async fn get_ip6_pool(&self, id: &ObjectId) -> Result<IpPool, ApstraError> {
        self.get_ip_pool(API_URL_IPV6_POOLS, id).await
    }

    /// The IPv6 pool with this display name
    pub async fn get_ip6_pool_by_name(&self, name: &str) -> Result<IpPool, ApstraError> {
        self.get_ip_pool_by_name(API_URL_IPV6_POOLS, name).await
    }

    /// Create an IPv6 pool
    pub async fn create_ip6_pool(&self, request: &IpPoolRequest) -> Result<ObjectId, ApstraError> {
        self.create_ip_pool(API_URL_IPV6_POOLS, request).await
    }

    /// Replace an IPv6 pool
    pub async fn update_ip6_pool(&self, id: &ObjectId, request: &IpPoolRequest) -> Result<(), ApstraError> {
        self.update_ip_pool(API_URL_IPV6_POOLS, id, request).await
    }

    /// Delete an IPv6 pool
    pub async fn delete_ip6_pool(&self, id: &ObjectId) -> Result<(), ApstraError> {
        self.delete_ip_pool(API_URL_IPV6_POOLS, id).await
    }

    // Security zones

    /// Create a security zone and wait for the blueprint to apply it
    pub async fn create_security_zone(
        &self,
        blueprint_id: &ObjectId,
        request: &SecurityZoneRequest,
    ) -> Result<ObjectId, ApstraError> {
        let body = serde_json::to_value(request)?;
        let response: ObjectIdResponse = self
            .talk_async(Method::POST, &security_zones_path(blueprint_id), Some(&body))
            .await?;
        info!(%blueprint_id, id = %response.id, label = %request.label, "Created security zone");
        Ok(response.id)
    }

    /// One security zone
    pub async fn get_security_zone(&self, blueprint_id: &ObjectId, id: &ObjectId) -> Result<SecurityZone, ApstraError> {
        self.http
            .get(&format!("{}/{}", security_zones_path(blueprint_id), id), &[])
            .await
    }

    /// Every security zone of a blueprint, ordered by id
    pub async fn get_all_security_zones(&self, blueprint_id: &ObjectId) -> Result<Vec<SecurityZone>, ApstraError> {
        let response: ItemsMapResponse<SecurityZone> =
            self.http.get(&security_zones_path(blueprint_id), &[]).await?;
        let mut zones: Vec<SecurityZone> = response.items.into_values().collect();
        zones.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(zones)
    }

    /// Delete a security zone and wait for the blueprint to apply it
    pub async fn delete_security_zone(&self, blueprint_id: &ObjectId, id: &ObjectId) -> Result<(), ApstraError> {
        let _: serde_json::Value = self
            .talk_async(
                Method::DELETE,
                &format!("{}/{}", security_zones_path(blueprint_id), id),
                None,
            )
            .await?;
        info!(%blueprint_id, %id, "Deleted security zone");
        Ok(())
    }

    // Tasks

    /// Wait for a task started elsewhere to finish
    pub async fn wait_for_task_completion(
        &self,
        blueprint_id: &ObjectId,
        task_id: &TaskId,
    ) -> Result<TaskDetail, ApstraError> {
        self.monitor
            .wait_for_task_completion(blueprint_id.clone(), task_id.clone())
            .await
    }

    /// Current status of the listed tasks. Tasks unknown to the server are
    /// absent from the result.
    pub async fn get_blueprint_tasks_status(
        &self,
        blueprint_id: &ObjectId,
        task_ids: &[TaskId],
    ) -> Result<HashMap<TaskId, String>, ApstraError> {
        self.http.poll_task_statuses(blueprint_id, task_ids).await
    }

    /// Full record of one task
    pub async fn get_blueprint_task(&self, blueprint_id: &ObjectId, task_id: &TaskId) -> Result<TaskDetail, ApstraError> {
        self.http.get_blueprint_task_detail(blueprint_id, task_id).await
    }
}

/// Reject server versions outside the supported set unless experimental
pub fn check_api_version(version: &str, experimental: bool) -> Result<(), ApstraError> {
    if api_version_supported(version) {
        return Ok(());
    }
    if experimental {
        warn!(version, "Apstra API version not supported, continuing in experimental mode");
        return Ok(());
    }
    Err(ApstraError::UnsupportedVersion {
        version: version.to_string(),
    })
}

/// True when `version` (`major.minor[.patch][-suffix]`) is one of
/// [`SUPPORTED_API_VERSIONS`]
pub fn api_version_supported(version: &str) -> bool {
    normalize_version(version).is_some_and(|v| SUPPORTED_API_VERSIONS.contains(&v.as_str()))
}

fn normalize_version(version: &str) -> Option<String> {
    let mut parts = version.trim().splitn(3, '.');
    let major = leading_number(parts.next()?)?;
    let minor = leading_number(parts.next()?)?;
    let patch = match parts.next() {
        Some(p) => leading_number(p)?,
        None => 0,
    };
    Some(format!("{}.{}.{}", major, minor, patch))
}

fn leading_number(s: &str) -> Option<u32> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s[..end].parse().ok()
}

/// Blueprint id named by a `/api/blueprints/<id>/...` path
pub(crate) fn blueprint_id_from_path(path: &str) -> Option<ObjectId> {
    let (_, rest) = path.split_once(BLUEPRINTS_PREFIX)?;
    let id = rest.split(['/', '?']).next()?;
    (!id.is_empty()).then(|| ObjectId::from(id))
}

fn security_zones_path(blueprint_id: &ObjectId) -> String {
    format!("{}{}/security-zones", BLUEPRINTS_PREFIX, blueprint_id)
}

fn decode_or_null<T: for<'de> Deserialize<'de>>(path: &str, text: &str) -> Result<T, ApstraError> {
    if text.trim().is_empty() {
        decode(path, "null")
    } else {
        decode(path, text)
    }
}

pub(crate) fn validate_asn_ranges(ranges: &[AsnRange]) -> Result<(), ApstraError> {
    for (i, range) in ranges.iter().enumerate() {
        if range.first > range.last {
            return Err(ApstraError::InvalidRequest(format!(
                "ASN range {}-{} is inverted",
                range.first, range.last
            )));
        }
        if let Some(other) = ranges[i + 1..].iter().find(|o| range.overlaps(o)) {
            return Err(ApstraError::InvalidRequest(format!(
                "ASN ranges {}-{} and {}-{} overlap",
                range.first, range.last, other.first, other.last
            )));
        }
    }
    Ok(())
}

#[async_trait::async_trait]
impl ApstraClientTrait for ApstraClient {
    fn base_url(&self) -> &str {
        self.base_url()
    }

    async fn login(&self) -> Result<(), ApstraError> {
        self.login().await
    }

    async fn logout(&self) -> Result<(), ApstraError> {
        self.logout().await
    }

    async fn shutdown(&self) {
        self.shutdown().await
    }

    async fn get_version(&self) -> Result<VersionResponse, ApstraError> {
        self.get_version().await
    }

    // Blueprints
    async fn list_blueprint_ids(&self) -> Result<Vec<ObjectId>, ApstraError> {
        self.list_blueprint_ids().await
    }

    async fn get_all_blueprint_status(&self) -> Result<Vec<BlueprintStatus>, ApstraError> {
        self.get_all_blueprint_status().await
    }

    async fn get_blueprint_status(&self, id: &ObjectId) -> Result<BlueprintStatus, ApstraError> {
        self.get_blueprint_status(id).await
    }

    async fn get_blueprint_status_by_name(&self, name: &str) -> Result<BlueprintStatus, ApstraError> {
        self.get_blueprint_status_by_name(name).await
    }

    async fn create_blueprint_from_template(
        &self,
        request: &CreateBlueprintFromTemplateRequest,
    ) -> Result<ObjectId, ApstraError> {
        self.create_blueprint_from_template(request).await
    }

    async fn delete_blueprint(&self, id: &ObjectId) -> Result<(), ApstraError> {
        self.delete_blueprint(id).await
    }

    // Design tags
    async fn list_design_tag_ids(&self) -> Result<Vec<ObjectId>, ApstraError> {
        self.list_design_tag_ids().await
    }

    async fn get_all_design_tags(&self) -> Result<Vec<DesignTag>, ApstraError> {
        self.get_all_design_tags().await
    }

    async fn get_design_tag(&self, id: &ObjectId) -> Result<DesignTag, ApstraError> {
        self.get_design_tag(id).await
    }

    async fn get_design_tag_by_label(&self, label: &str) -> Result<DesignTag, ApstraError> {
        self.get_design_tag_by_label(label).await
    }

    async fn create_design_tag(&self, request: &DesignTagRequest) -> Result<ObjectId, ApstraError> {
        self.create_design_tag(request).await
    }

    async fn update_design_tag(&self, id: &ObjectId, request: &DesignTagRequest) -> Result<(), ApstraError> {
        self.update_design_tag(id, request).await
    }

    async fn delete_design_tag(&self, id: &ObjectId) -> Result<(), ApstraError> {
        self.delete_design_tag(id).await
    }

    // ASN pools
    async fn list_asn_pool_ids(&self) -> Result<Vec<ObjectId>, ApstraError> {
        self.list_asn_pool_ids().await
    }

    async fn get_asn_pools(&self) -> Result<Vec<AsnPool>, ApstraError> {
        self.get_asn_pools().await
    }

    async fn get_asn_pool(&self, id: &ObjectId) -> Result<AsnPool, ApstraError> {
        self.get_asn_pool(id).await
    }

    async fn get_asn_pool_by_name(&self, name: &str) -> Result<AsnPool, ApstraError> {
        self.get_asn_pool_by_name(name).await
    }

    async fn create_asn_pool(&self, request: &AsnPoolRequest) -> Result<ObjectId, ApstraError> {
        self.create_asn_pool(request).await
    }

    async fn update_asn_pool(&self, id: &ObjectId, request: &AsnPoolRequest) -> Result<(), ApstraError> {
        self.update_asn_pool(id, request).await
    }

    async fn delete_asn_pool(&self, id: &ObjectId) -> Result<(), ApstraError> {
        self.delete_asn_pool(id).await
    }

    // IPv4 pools
    async fn list_ip4_pool_ids(&self) -> Result<Vec<ObjectId>, ApstraError> {
        self.list_ip4_pool_ids().await
    }

    async fn get_ip4_pools(&self) -> Result<Vec<IpPool>, ApstraError> {
        self.get_ip4_pools().await
    }

    async fn get_ip4_pool(&self, id: &ObjectId) -> Result<IpPool, ApstraError> {
        self.get_ip4_pool(id).await
    }

    async fn get_ip4_pool_by_name(&self, name: &str) -> Result<IpPool, ApstraError> {
        self.get_ip4_pool_by_name(name).await
    }

    async fn create_ip4_pool(&self, request: &IpPoolRequest) -> Result<ObjectId, ApstraError> {
        self.create_ip4_pool(request).await
    }

    async fn update_ip4_pool(&self, id: &ObjectId, request: &IpPoolRequest) -> Result<(), ApstraError> {
        self.update_ip4_pool(id, request).await
    }

    async fn delete_ip4_pool(&self, id: &ObjectId) -> Result<(), ApstraError> {
        self.delete_ip4_pool(id).await
    }

    // IPv6 pools
    async fn list_ip6_pool_ids(&self) -> Result<Vec<ObjectId>, ApstraError> {
        self.list_ip6_pool_ids().await
    }

    async fn get_ip6_pools(&self) -> Result<Vec<IpPool>, ApstraError> {
        self.get_ip6_pools().await
    }

    async fn get_ip6_pool(&self, id: &ObjectId) -> Result<IpPool, ApstraError> {
        self.get_ip6_pool(id).await
    }

    async fn get_ip6_pool_by_name(&self, name: &str) -> Result<IpPool, ApstraError> {
        self.get_ip6_pool_by_name(name).await
    }

    async fn create_ip6_pool(&self, request: &IpPoolRequest) -> Result<ObjectId, ApstraError> {
        self.create_ip6_pool(request).await
    }

    async fn update_ip6_pool(&self, id: &ObjectId, request: &IpPoolRequest) -> Result<(), ApstraError> {
        self.update_ip6_pool(id, request).await
    }

    async fn delete_ip6_pool(&self, id: &ObjectId) -> Result<(), ApstraError> {
        self.delete_ip6_pool(id).await
    }

    // Security zones
    async fn create_security_zone(
        &self,
        blueprint_id: &ObjectId,
        request: &SecurityZoneRequest,
    ) -> Result<ObjectId, ApstraError> {
        self.create_security_zone(blueprint_id, request).await
    }

    async fn get_security_zone(&self, blueprint_id: &ObjectId, id: &ObjectId) -> Result<SecurityZone, ApstraError> {
        self.get_security_zone(blueprint_id, id).await
    }

    async fn get_all_security_zones(&self, blueprint_id: &ObjectId) -> Result<Vec<SecurityZone>, ApstraError> {
        self.get_all_security_zones(blueprint_id).await
    }

    async fn delete_security_zone(&self, blueprint_id: &ObjectId, id: &ObjectId) -> Result<(), ApstraError> {
        self.delete_security_zone(blueprint_id, id).await
    }

    // Tasks
    async fn wait_for_task_completion(
        &self,
        blueprint_id: &ObjectId,
        task_id: &TaskId,
    ) -> Result<TaskDetail, ApstraError> {
        self.wait_for_task_completion(blueprint_id, task_id).await
    }

    async fn get_blueprint_tasks_status(
        &self,
        blueprint_id: &ObjectId,
        task_ids: &[TaskId],
    ) -> Result<HashMap<TaskId, String>, ApstraError> {
        self.get_blueprint_tasks_status(blueprint_id, task_ids).await
    }

    async fn get_blueprint_task(&self, blueprint_id: &ObjectId, task_id: &TaskId) -> Result<TaskDetail, ApstraError> {
        self.get_blueprint_task(blueprint_id, task_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_versions() {
        for v in SUPPORTED_API_VERSIONS {
            assert!(api_version_supported(v), "{v}");
        }
        assert!(api_version_supported("4.1.2-150"));
        assert!(api_version_supported("4.2"));
        assert!(!api_version_supported("4.0.2"));
        assert!(!api_version_supported("5.0.0"));
        assert!(!api_version_supported("garbage"));
        assert!(!api_version_supported(""));
    }

    #[test]
    fn test_check_api_version_experimental() {
        assert!(check_api_version("4.2.1", false).is_ok());
        assert!(matches!(
            check_api_version("9.9.9", false),
            Err(ApstraError::UnsupportedVersion { .. })
        ));
        assert!(check_api_version("9.9.9", true).is_ok());
    }

    #[test]
    fn test_blueprint_id_from_path() {
        assert_eq!(
            blueprint_id_from_path("/api/blueprints/bp-1/security-zones"),
            Some(ObjectId::from("bp-1"))
        );
        assert_eq!(blueprint_id_from_path("/api/blueprints/bp-2"), Some(ObjectId::from("bp-2")));
        assert_eq!(
            blueprint_id_from_path("https://apstra/api/blueprints/bp-3/tasks/"),
            Some(ObjectId::from("bp-3"))
        );
        assert_eq!(blueprint_id_from_path("/api/blueprints"), None);
        assert_eq!(blueprint_id_from_path("/api/blueprints/"), None);
        assert_eq!(blueprint_id_from_path("/api/design/tags"), None);
    }

    #[test]
    fn test_validate_asn_ranges() {
        assert!(validate_asn_ranges(&[AsnRange::new(1, 10), AsnRange::new(11, 20)]).is_ok());
        assert!(validate_asn_ranges(&[AsnRange::new(1, 10), AsnRange::new(10, 20)]).is_err());
        assert!(validate_asn_ranges(&[AsnRange::new(20, 10)]).is_err());
        assert!(validate_asn_ranges(&[]).is_ok());
    }
}
