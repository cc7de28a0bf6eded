//! Resource pool operations for MockApstraClient
//!
//! Handles ASN pools and IPv4/IPv6 pools

use super::helpers::{asn_pool_from_request, ip_pool_from_request, lock, new_object_id, now};
use super::{IpFamily, MockApstraClient};
use crate::client::validate_asn_ranges;
use crate::common::query::find_exactly_one;
use crate::error::ApstraError;
use crate::models::*;

pub async fn get_asn_pools(client: &MockApstraClient) -> Result<Vec<AsnPool>, ApstraError> {
    let mut pools: Vec<AsnPool> = lock(&client.asn_pools).values().cloned().collect();
    pools.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(pools)
}

pub async fn get_asn_pool(client: &MockApstraClient, id: &ObjectId) -> Result<AsnPool, ApstraError> {
    lock(&client.asn_pools)
        .get(id)
        .cloned()
        .ok_or_else(|| ApstraError::NotFound(format!("ASN pool '{}' not found", id)))
}

pub async fn get_asn_pool_by_name(client: &MockApstraClient, name: &str) -> Result<AsnPool, ApstraError> {
    let pools = get_asn_pools(client).await?;
    find_exactly_one(pools, "ASN pool", name, |p| p.display_name == name)
}

pub async fn create_asn_pool(client: &MockApstraClient, request: &AsnPoolRequest) -> Result<ObjectId, ApstraError> {
    validate_asn_ranges(&request.ranges)?;
    let id = new_object_id();
    lock(&client.asn_pools).insert(id.clone(), asn_pool_from_request(id.clone(), request));
    Ok(id)
}

pub async fn update_asn_pool(
    client: &MockApstraClient,
    id: &ObjectId,
    request: &AsnPoolRequest,
) -> Result<(), ApstraError> {
    validate_asn_ranges(&request.ranges)?;
    let mut pools = lock(&client.asn_pools);
    let existing = pools
        .get(id)
        .ok_or_else(|| ApstraError::NotFound(format!("ASN pool '{}' not found", id)))?;

    let mut updated = asn_pool_from_request(id.clone(), request);
    updated.created_at = existing.created_at.clone();
    pools.insert(id.clone(), updated);
    Ok(())
}

pub async fn delete_asn_pool(client: &MockApstraClient, id: &ObjectId) -> Result<(), ApstraError> {
    lock(&client.asn_pools)
        .remove(id)
        .map(|_| ())
        .ok_or_else(|| ApstraError::NotFound(format!("ASN pool '{}' not found", id)))
}

pub async fn get_ip_pools(client: &MockApstraClient, family: IpFamily) -> Result<Vec<IpPool>, ApstraError> {
    let mut pools: Vec<IpPool> = lock(client.ip_store(family)).values().cloned().collect();
    pools.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(pools)
}

pub async fn get_ip_pool(client: &MockApstraClient, family: IpFamily, id: &ObjectId) -> Result<IpPool, ApstraError> {
    lock(client.ip_store(family))
        .get(id)
        .cloned()
        .ok_or_else(|| ApstraError::NotFound(format!("{} pool '{}' not found", family, id)))
}

pub async fn get_ip_pool_by_name(client: &MockApstraClient, family: IpFamily, name: &str) -> Result<IpPool, ApstraError> {
    let pools = get_ip_pools(client, family).await?;
    find_exactly_one(pools, "IP pool", name, |p| p.display_name == name)
}

pub async fn create_ip_pool(
    client: &MockApstraClient,
    family: IpFamily,
    request: &IpPoolRequest,
) -> Result<ObjectId, ApstraError> {
    let id = new_object_id();
    let pool = ip_pool_from_request(id.clone(), request, family.address_bits())?;
    lock(client.ip_store(family)).insert(id.clone(), pool);
    Ok(id)
}

pub async fn update_ip_pool(
    client: &MockApstraClient,
    family: IpFamily,
    id: &ObjectId,
    request: &IpPoolRequest,
) -> Result<(), ApstraError> {
    let mut pools = lock(client.ip_store(family));
    let existing = pools
        .get(id)
        .ok_or_else(|| ApstraError::NotFound(format!("{} pool '{}' not found", family, id)))?;

    let mut updated = ip_pool_from_request(id.clone(), request, family.address_bits())?;
    updated.created_at = existing.created_at.clone();
    updated.last_modified_at = now();
    pools.insert(id.clone(), updated);
    Ok(())
}

pub async fn delete_ip_pool(client: &MockApstraClient, family: IpFamily, id: &ObjectId) -> Result<(), ApstraError> {
    lock(client.ip_store(family))
        .remove(id)
        .map(|_| ())
        .ok_or_else(|| ApstraError::NotFound(format!("{} pool '{}' not found", family, id)))
}
