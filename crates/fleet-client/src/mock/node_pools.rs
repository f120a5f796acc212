//! Node pool operations for MockFleetClient

use super::{MockFleetClient, MockOp, condition_for};
use crate::error::FleetError;
use crate::models::*;

pub async fn create_node_pool(client: &MockFleetClient, pool: &NodePool) -> Result<NodePool, FleetError> {
    client.record(MockOp::CreateNodePool, pool.name())?;

    let mut pools = client.node_pools.lock().unwrap();
    if pools.contains_key(&pool.full_name) {
        return Err(FleetError::AlreadyExists(format!(
            "Node pool {} already exists",
            pool.full_name
        )));
    }

    let now = chrono::Utc::now();
    let created = NodePool {
        full_name: pool.full_name.clone(),
        spec: pool.spec.clone(),
        status: Some(NodePoolStatus {
            phase: Phase::Creating,
            conditions: vec![],
            created_at: Some(now),
            last_updated: Some(now),
        }),
    };
    pools.insert(created.full_name.clone(), created.clone());
    Ok(created)
}

pub async fn get_node_pool(client: &MockFleetClient, id: &NodePoolIdentity) -> Result<NodePool, FleetError> {
    client.record(MockOp::GetNodePool, &id.name)?;
    let not_found = || FleetError::NotFound(format!("Node pool {} not found", id));

    match client.observe_delete(&id.name) {
        Some(true) => {
            let mut pools = client.node_pools.lock().unwrap();
            let pool = pools.get_mut(id).ok_or_else(not_found)?;
            if let Some(status) = pool.status.as_mut() {
                status.phase = Phase::Deleting;
            }
            return Ok(pool.clone());
        }
        Some(false) => {
            client.node_pools.lock().unwrap().remove(id);
            return Err(not_found());
        }
        None => {}
    }

    let scripted = client.next_scripted(&id.name);
    let sticky = client.is_scripted(&id.name);
    let mut pools = client.node_pools.lock().unwrap();
    let pool = pools.get_mut(id).ok_or_else(not_found)?;
    let status = pool.status.get_or_insert_with(NodePoolStatus::default);

    match scripted {
        Some(step) => {
            status.phase = step.phase;
            status.conditions = step.message.as_deref().map(condition_for).into_iter().collect();
        }
        // Unscripted pools finish provisioning on the first observation
        None if !sticky && matches!(status.phase, Phase::Creating | Phase::Updating) => {
            status.phase = Phase::Ready;
        }
        None => {}
    }
    status.last_updated = Some(chrono::Utc::now());

    Ok(pool.clone())
}

pub async fn list_node_pools(client: &MockFleetClient, cluster: &ClusterIdentity) -> Result<Vec<NodePool>, FleetError> {
    client.record(MockOp::ListNodePools, &cluster.cluster_name)?;

    let mut pools: Vec<NodePool> = client
        .node_pools
        .lock()
        .unwrap()
        .values()
        .filter(|p| p.full_name.belongs_to(cluster))
        .cloned()
        .collect();
    pools.sort_by(|a, b| a.name().cmp(b.name()));
    Ok(pools)
}

pub async fn update_node_pool(client: &MockFleetClient, pool: &NodePool) -> Result<NodePool, FleetError> {
    client.record(MockOp::UpdateNodePool, pool.name())?;

    let mut pools = client.node_pools.lock().unwrap();
    let existing = pools
        .get_mut(&pool.full_name)
        .ok_or_else(|| FleetError::NotFound(format!("Node pool {} not found", pool.full_name)))?;

    existing.spec = pool.spec.clone();
    let status = existing.status.get_or_insert_with(NodePoolStatus::default);
    status.phase = Phase::Updating;
    status.conditions.clear();
    status.last_updated = Some(chrono::Utc::now());
    Ok(existing.clone())
}

pub async fn delete_node_pool(client: &MockFleetClient, id: &NodePoolIdentity) -> Result<(), FleetError> {
    client.record(MockOp::DeleteNodePool, &id.name)?;

    let mut pools = client.node_pools.lock().unwrap();
    if !pools.contains_key(id) {
        return Err(FleetError::NotFound(format!("Node pool {} not found", id)));
    }

    if client.begin_delete(&id.name) {
        if let Some(status) = pools.get_mut(id).and_then(|p| p.status.as_mut()) {
            status.phase = Phase::Deleting;
        }
    } else {
        pools.remove(id);
    }
    Ok(())
}
