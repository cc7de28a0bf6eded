//! Apstra API models
//!
//! These models match the JSON payloads exchanged with the Apstra REST API.
//! Only fields the client reads are modeled; everything else is ignored on
//! decode.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identifier Apstra assigns to objects (blueprints, pools, tags, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

/// Identifier of one asynchronous operation on the Apstra server
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            /// Create an id from anything string-like
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the id as `&str`
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// True when the id is the empty string
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(ObjectId);
string_id!(TaskId);

/// Coarse task status as reported by `/api/blueprints/<id>/tasks/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// `init` - queued, not yet running
    Init,
    /// `in_progress` - running
    InProgress,
    /// `succeeded`
    Succeeded,
    /// `failed`
    Failed,
    /// `timeout`
    Timeout,
    /// Anything else the server sends
    Unknown(String),
}

impl TaskStatus {
    /// Classify a raw status string. Matching is exact and case-sensitive.
    pub fn parse(s: &str) -> Self {
        match s {
            "init" => TaskStatus::Init,
            "in_progress" => TaskStatus::InProgress,
            "succeeded" => TaskStatus::Succeeded,
            "failed" => TaskStatus::Failed,
            "timeout" => TaskStatus::Timeout,
            other => TaskStatus::Unknown(other.to_string()),
        }
    }

    /// Wire representation
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Init => "init",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Succeeded => "succeeded",
            TaskStatus::Failed => "failed",
            TaskStatus::Timeout => "timeout",
            TaskStatus::Unknown(s) => s,
        }
    }

    /// Task is still queued or running
    pub fn is_pending(&self) -> bool {
        matches!(self, TaskStatus::Init | TaskStatus::InProgress)
    }

    /// Task reached one of the three recognized terminal states
    pub fn is_done(&self) -> bool {
        matches!(self, TaskStatus::Succeeded | TaskStatus::Failed | TaskStatus::Timeout)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Apstra list wrapper: `{"items": [...]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsResponse<T> {
    pub items: Vec<T>,
}

/// Apstra keyed list wrapper: `{"items": {"<id>": {...}}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsMapResponse<T> {
    pub items: HashMap<String, T>,
}

/// Returned by calls which create an object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectIdResponse {
    pub id: ObjectId,
}

/// Returned by calls made with `async=full`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskIdResponse {
    pub task_id: TaskId,
}

impl TaskIdResponse {
    /// Try to read a body as a task-id envelope. Anything that fails to
    /// parse, or parses with an empty id, is not a task-id response.
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str::<TaskIdResponse>(body)
            .ok()
            .filter(|r| !r.task_id.is_empty())
    }
}

/// Request line captured by the task list endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskSummaryRequest {
    pub url: String,
    pub method: String,
}

/// One item from GET `/api/blueprints/<id>/tasks/`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskSummary {
    pub id: TaskId,
    pub status: String,
    pub begin_at: String,
    pub request_data: TaskSummaryRequest,
    pub user_id: String,
    pub last_updated_at: String,
    pub user_name: String,
    pub created_at: String,
    pub config_last_updated_at: String,
    pub user_ip: String,
    #[serde(rename = "type")]
    pub task_type: String,
}

/// Request captured in a task detail record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskRequestData {
    pub url: String,
    pub headers: HashMap<String, String>,
    pub args: HashMap<String, String>,
    pub data: serde_json::Value,
    pub method: String,
}

/// Outcome section of a task detail record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailedStatus {
    pub api_response: serde_json::Value,
    pub config_blueprint_version: i64,
    pub errors: serde_json::Value,
    pub error_code: i64,
}

/// GET `/api/blueprints/<id>/tasks/<task_id>`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskDetail {
    pub id: TaskId,
    pub status: String,
    pub begin_at: String,
    pub request_data: TaskRequestData,
    pub user_id: String,
    pub last_updated_at: String,
    pub user_name: String,
    pub created_at: String,
    pub detailed_status: DetailedStatus,
    pub config_last_updated_at: String,
    pub user_ip: String,
    #[serde(rename = "type")]
    pub task_type: String,
}

impl TaskDetail {
    /// Parsed status
    pub fn task_status(&self) -> TaskStatus {
        TaskStatus::parse(&self.status)
    }
}

/// POST `/api/user/login` request body
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// POST `/api/user/login` response body
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub id: ObjectId,
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"<redacted>")
            .field("id", &self.id)
            .finish()
    }
}

/// GET `/api/version`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionResponse {
    pub major: String,
    pub minor: String,
    pub version: String,
    pub build: String,
}

/// Blueprint reference design
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefDesign {
    #[serde(rename = "two_stage_l3clos")]
    TwoStageL3Clos,
    Freeform,
    #[serde(other)]
    Unknown,
}

/// Entry from GET `/api/blueprints`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueprintStatus {
    pub id: ObjectId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub status: String,
    #[serde(default = "default_design")]
    pub design: RefDesign,
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub has_uncommitted_changes: bool,
    #[serde(default)]
    pub build_errors_count: i64,
    #[serde(default)]
    pub build_warnings_count: i64,
    #[serde(default)]
    pub anomaly_counts: serde_json::Value,
    #[serde(default)]
    pub last_modified_at: String,
}

fn default_design() -> RefDesign {
    RefDesign::Unknown
}

/// POST `/api/blueprints`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBlueprintFromTemplateRequest {
    pub design: RefDesign,
    pub init_type: String,
    pub label: String,
    pub template_id: ObjectId,
}

impl CreateBlueprintFromTemplateRequest {
    /// Standard template-reference request
    pub fn new(design: RefDesign, label: impl Into<String>, template_id: ObjectId) -> Self {
        Self {
            design,
            init_type: "template_reference".to_string(),
            label: label.into(),
            template_id,
        }
    }
}

/// Design tag (`/api/design/tags`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignTag {
    pub id: ObjectId,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub last_modified_at: String,
}

/// Create/update body for a design tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignTagRequest {
    pub label: String,
    #[serde(default)]
    pub description: String,
}

/// One ASN range inside a pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsnRange {
    pub first: u32,
    pub last: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(default, skip_serializing)]
    pub total: u64,
    #[serde(default, skip_serializing)]
    pub used: u64,
    #[serde(default, skip_serializing)]
    pub used_percentage: f64,
}

impl AsnRange {
    /// Range to submit in a create/update request
    pub fn new(first: u32, last: u32) -> Self {
        Self {
            first,
            last,
            status: String::new(),
            total: 0,
            used: 0,
            used_percentage: 0.0,
        }
    }

    /// True when the two ranges share at least one ASN
    pub fn overlaps(&self, other: &AsnRange) -> bool {
        self.first <= other.last && other.first <= self.last
    }
}

/// ASN pool (`/api/resources/asn-pools`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsnPool {
    pub id: ObjectId,
    pub display_name: String,
    #[serde(default)]
    pub ranges: Vec<AsnRange>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub used: u64,
    #[serde(default)]
    pub used_percentage: f64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub last_modified_at: String,
}

/// Create/update body for an ASN pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsnPoolRequest {
    pub display_name: String,
    pub ranges: Vec<AsnRange>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One subnet inside an IP pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpSubnet {
    pub network: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(default, deserialize_with = "string_or_number", skip_serializing)]
    pub total: String,
    #[serde(default, deserialize_with = "string_or_number", skip_serializing)]
    pub used: String,
    #[serde(default, skip_serializing)]
    pub used_percentage: f64,
}

impl IpSubnet {
    /// Subnet to submit in a create/update request
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            status: String::new(),
            total: String::new(),
            used: String::new(),
            used_percentage: 0.0,
        }
    }
}

/// IPv4 or IPv6 pool (`/api/resources/ip-pools`, `/api/resources/ipv6-pools`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpPool {
    pub id: ObjectId,
    pub display_name: String,
    #[serde(default)]
    pub subnets: Vec<IpSubnet>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub tags: Vec<String>,
    // IPv6 pool sizes overflow JSON numbers, so Apstra sends these as strings
    #[serde(default, deserialize_with = "string_or_number")]
    pub total: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub used: String,
    #[serde(default)]
    pub used_percentage: f64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub last_modified_at: String,
}

/// Create/update body for an IP pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpPoolRequest {
    pub display_name: String,
    pub subnets: Vec<IpSubnet>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Security zone (routing zone / VRF) type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityZoneType {
    Evpn,
    L3Fabric,
    #[serde(other)]
    Unknown,
}

/// Security zone (`/api/blueprints/<id>/security-zones`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityZone {
    pub id: ObjectId,
    pub label: String,
    pub vrf_name: String,
    pub sz_type: SecurityZoneType,
    #[serde(default)]
    pub vni_id: Option<u32>,
    #[serde(default)]
    pub vlan_id: Option<u16>,
    #[serde(default)]
    pub routing_policy_id: Option<ObjectId>,
}

/// Create body for a security zone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityZoneRequest {
    pub label: String,
    pub vrf_name: String,
    pub sz_type: SecurityZoneType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vni_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_policy_id: Option<ObjectId>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_vocabulary() {
        assert_eq!(TaskStatus::parse("init"), TaskStatus::Init);
        assert_eq!(TaskStatus::parse("in_progress"), TaskStatus::InProgress);
        assert_eq!(TaskStatus::parse("succeeded"), TaskStatus::Succeeded);
        assert_eq!(TaskStatus::parse("failed"), TaskStatus::Failed);
        assert_eq!(TaskStatus::parse("timeout"), TaskStatus::Timeout);
        // case-sensitive
        assert_eq!(
            TaskStatus::parse("Succeeded"),
            TaskStatus::Unknown("Succeeded".to_string())
        );
        assert!(TaskStatus::parse("init").is_pending());
        assert!(!TaskStatus::parse("weird_status").is_done());
        assert!(!TaskStatus::parse("weird_status").is_pending());
    }

    #[test]
    fn test_task_id_response_parse() {
        assert!(TaskIdResponse::parse("").is_none());
        assert!(TaskIdResponse::parse("{}").is_none());
        assert!(TaskIdResponse::parse("[]").is_none());
        assert!(TaskIdResponse::parse(r#"{"task_id":""}"#).is_none());
        let parsed = TaskIdResponse::parse(r#"{"task_id":"abc"}"#).unwrap();
        assert_eq!(parsed.task_id, TaskId::from("abc"));
    }

    #[test]
    fn test_task_detail_decodes_partial_record() {
        let json = r#"{
            "id": "t1",
            "status": "succeeded",
            "detailed_status": {"api_response": {"id": "sz1"}, "error_code": 0},
            "type": "blueprint"
        }"#;
        let detail: TaskDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.task_status(), TaskStatus::Succeeded);
        assert_eq!(detail.detailed_status.api_response["id"], "sz1");
        assert_eq!(detail.task_type, "blueprint");
    }

    #[test]
    fn test_ip_pool_totals_accept_strings_and_numbers() {
        let json = r#"{"id":"p1","display_name":"v6","total":"340282366920938463463374607431768211456","used":3}"#;
        let pool: IpPool = serde_json::from_str(json).unwrap();
        assert_eq!(pool.total, "340282366920938463463374607431768211456");
        assert_eq!(pool.used, "3");
    }

    #[test]
    fn test_asn_range_overlap() {
        let a = AsnRange::new(100, 200);
        assert!(a.overlaps(&AsnRange::new(200, 300)));
        assert!(a.overlaps(&AsnRange::new(150, 160)));
        assert!(a.overlaps(&AsnRange::new(50, 100)));
        assert!(!a.overlaps(&AsnRange::new(201, 300)));
    }

    #[test]
    fn test_login_request_debug_redacts_password() {
        let req = LoginRequest {
            username: "admin".to_string(),
            password: "secret".to_string(),
        };
        let dbg = format!("{:?}", req);
        assert!(dbg.contains("admin"));
        assert!(!dbg.contains("secret"));
    }
}
