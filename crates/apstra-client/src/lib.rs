//! Apstra REST API Client
//!
//! A Rust client library for interacting with the Apstra fabric controller REST API.
//! Provides type-safe models and methods for blueprint, design and resource
//! pool operations, plus a background task monitor that turns asynchronous
//! (`async=full`) blueprint mutations into awaitable results.
//!
//! # Example
//!
//! ```no_run
//! use apstra_client::{ApstraClient, ClientConfig, ObjectId, SecurityZoneRequest, SecurityZoneType};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Create a client; checks the server version and starts the task monitor
//! let client = ApstraClient::new(ClientConfig::new(
//!     "https://apstra.example.com",
//!     "admin",
//!     "password",
//! ))
//! .await?;
//!
//! // Query blueprints
//! let blueprint = client.get_blueprint_status_by_name("dc1").await?;
//!
//! // Create a routing zone; returns once Apstra has applied the change
//! let request = SecurityZoneRequest {
//!     label: "blue".to_string(),
//!     vrf_name: "blue".to_string(),
//!     sz_type: SecurityZoneType::Evpn,
//!     vni_id: None,
//!     vlan_id: None,
//!     routing_policy_id: None,
//! };
//! let zone_id: ObjectId = client.create_security_zone(&blueprint.id, &request).await?;
//!
//! // Drain outstanding task waits before exit
//! client.shutdown().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Task monitoring**: one background task polls blueprint task status in batches
//! - **Re-login**: requests answered with HTTP 401 log in and retry once
//! - **Version gate**: unsupported server versions are refused unless experimental
//! - **Mocking**: `MockApstraClient` behind the `test-util` feature

#[path = "trait.rs"]
pub mod apstra_trait;
pub mod client;
pub mod common;
pub mod config;
pub mod error;
pub mod models;
pub mod task_monitor;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;


pub use apstra_trait::ApstraClientTrait;
pub use client::ApstraClient;
pub use common::HttpClient;
pub use config::{ClientConfig, TaskMonitorConfig};
pub use error::ApstraError;
pub use models::*;
pub use task_monitor::{TaskMonitorHandle, TaskMonitorShutdown, TaskStatusSource, spawn_task_monitor};
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockApstraClient;

/// Route `tracing` output through the test harness. Safe to call from
/// every test.
#[cfg(test)]
pub(crate) fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
