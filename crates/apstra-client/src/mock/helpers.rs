//! Helper functions for building Apstra model values in the mock

use crate::models::*;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mock store. A test that panicked while holding the lock leaves
/// the data usable.
pub(crate) fn lock<T>(store: &Mutex<T>) -> MutexGuard<'_, T> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fresh server-style object id
pub(crate) fn new_object_id() -> ObjectId {
    ObjectId::new(uuid::Uuid::new_v4().to_string())
}

/// Fresh server-style task id
pub(crate) fn new_task_id() -> TaskId {
    TaskId::new(uuid::Uuid::new_v4().to_string())
}

/// Timestamp in the format Apstra reports
pub(crate) fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Number of ASNs covered by a set of ranges
pub(crate) fn asn_total(ranges: &[AsnRange]) -> u64 {
    ranges
        .iter()
        .map(|r| u64::from(r.last) - u64::from(r.first) + 1)
        .sum()
}

/// Number of addresses in a `network/len` string, as Apstra reports it.
/// `None` for malformed input.
pub(crate) fn subnet_size(network: &str, address_bits: u32) -> Option<String> {
    let (_, len) = network.split_once('/')?;
    let len: u32 = len.parse().ok()?;
    if len > address_bits {
        return None;
    }
    let host_bits = address_bits - len;
    if host_bits >= 128 {
        // 2^128 does not fit u128
        return Some("340282366920938463463374607431768211456".to_string());
    }
    Some((1u128 << host_bits).to_string())
}

/// Stored pool built from a create request
pub(crate) fn ip_pool_from_request(
    id: ObjectId,
    request: &IpPoolRequest,
    address_bits: u32,
) -> Result<IpPool, crate::error::ApstraError> {
    let mut total: u128 = 0;
    let mut subnets = Vec::with_capacity(request.subnets.len());
    for subnet in &request.subnets {
        let size = subnet_size(&subnet.network, address_bits).ok_or_else(|| {
            crate::error::ApstraError::InvalidRequest(format!("invalid subnet '{}'", subnet.network))
        })?;
        total = total.saturating_add(size.parse::<u128>().unwrap_or(u128::MAX));
        subnets.push(IpSubnet {
            network: subnet.network.clone(),
            status: "not_in_use".to_string(),
            total: size,
            used: "0".to_string(),
            used_percentage: 0.0,
        });
    }

    let now = now();
    Ok(IpPool {
        id,
        display_name: request.display_name.clone(),
        subnets,
        status: "not_in_use".to_string(),
        tags: request.tags.clone(),
        total: total.to_string(),
        used: "0".to_string(),
        used_percentage: 0.0,
        created_at: now.clone(),
        last_modified_at: now,
    })
}

/// Stored ASN pool built from a create request
pub(crate) fn asn_pool_from_request(id: ObjectId, request: &AsnPoolRequest) -> AsnPool {
    let ranges: Vec<AsnRange> = request
        .ranges
        .iter()
        .map(|r| AsnRange {
            status: "pool_element_available".to_string(),
            total: u64::from(r.last) - u64::from(r.first) + 1,
            ..r.clone()
        })
        .collect();
    let now = now();
    AsnPool {
        id,
        display_name: request.display_name.clone(),
        total: asn_total(&ranges),
        ranges,
        status: "not_in_use".to_string(),
        tags: request.tags.clone(),
        used: 0,
        used_percentage: 0.0,
        created_at: now.clone(),
        last_modified_at: now,
    }
}

/// Succeeded task record carrying `api_response`
pub(crate) fn succeeded_task(task_id: TaskId, url: String, method: &str, api_response: serde_json::Value) -> TaskDetail {
    let now = now();
    TaskDetail {
        id: task_id,
        status: TaskStatus::Succeeded.to_string(),
        begin_at: now.clone(),
        request_data: TaskRequestData {
            url,
            method: method.to_string(),
            ..Default::default()
        },
        last_updated_at: now.clone(),
        created_at: now,
        detailed_status: DetailedStatus {
            api_response,
            ..Default::default()
        },
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subnet_size() {
        assert_eq!(subnet_size("10.0.0.0/24", 32).as_deref(), Some("256"));
        assert_eq!(subnet_size("10.0.0.1/32", 32).as_deref(), Some("1"));
        assert_eq!(subnet_size("2001:db8::/64", 128).as_deref(), Some("18446744073709551616"));
        assert_eq!(
            subnet_size("::/0", 128).as_deref(),
            Some("340282366920938463463374607431768211456")
        );
        assert!(subnet_size("10.0.0.0/33", 32).is_none());
        assert!(subnet_size("10.0.0.0", 32).is_none());
    }

    #[test]
    fn test_asn_total() {
        assert_eq!(asn_total(&[AsnRange::new(100, 199), AsnRange::new(300, 300)]), 101);
        assert_eq!(asn_total(&[AsnRange::new(0, u32::MAX)]), 1u64 << 32);
    }
}
