//! Cluster operations for MockFleetClient

use super::{MockFleetClient, MockOp, condition_for};
use crate::error::FleetError;
use crate::models::*;

pub async fn create_cluster(client: &MockFleetClient, cluster: &Cluster) -> Result<Cluster, FleetError> {
    let id = &cluster.full_name;
    client.record(MockOp::CreateCluster, &id.cluster_name)?;

    let mut clusters = client.clusters.lock().unwrap();
    if clusters.contains_key(id) {
        return Err(FleetError::AlreadyExists(format!("Cluster {} already exists", id)));
    }

    let created = Cluster {
        full_name: id.clone(),
        spec: cluster.spec.clone(),
        status: Some(ClusterStatus {
            phase: Phase::Creating,
            conditions: vec![],
            last_updated: Some(chrono::Utc::now()),
        }),
    };
    clusters.insert(id.clone(), created.clone());
    Ok(created)
}

pub async fn get_cluster(client: &MockFleetClient, id: &ClusterIdentity) -> Result<Cluster, FleetError> {
    client.record(MockOp::GetCluster, &id.cluster_name)?;
    let not_found = || FleetError::NotFound(format!("Cluster {} not found", id));

    match client.observe_delete(&id.cluster_name) {
        Some(true) => {
            let mut clusters = client.clusters.lock().unwrap();
            let cluster = clusters.get_mut(id).ok_or_else(not_found)?;
            if let Some(status) = cluster.status.as_mut() {
                status.phase = Phase::Deleting;
            }
            return Ok(cluster.clone());
        }
        Some(false) => {
            remove_cluster(client, id);
            return Err(not_found());
        }
        None => {}
    }

    let scripted = client.next_scripted(&id.cluster_name);
    let sticky = client.is_scripted(&id.cluster_name);
    let mut clusters = client.clusters.lock().unwrap();
    let cluster = clusters.get_mut(id).ok_or_else(not_found)?;
    let status = cluster.status.get_or_insert_with(ClusterStatus::default);

    match scripted {
        Some(step) => {
            status.phase = step.phase;
            status.conditions = step.message.as_deref().map(condition_for).into_iter().collect();
        }
        None if !sticky && matches!(status.phase, Phase::Creating | Phase::Updating) => {
            status.phase = Phase::Ready;
        }
        None => {}
    }
    status.last_updated = Some(chrono::Utc::now());

    Ok(cluster.clone())
}

pub async fn update_cluster(client: &MockFleetClient, cluster: &Cluster) -> Result<Cluster, FleetError> {
    let id = &cluster.full_name;
    client.record(MockOp::UpdateCluster, &id.cluster_name)?;

    let mut clusters = client.clusters.lock().unwrap();
    let existing = clusters
        .get_mut(id)
        .ok_or_else(|| FleetError::NotFound(format!("Cluster {} not found", id)))?;

    existing.spec = cluster.spec.clone();
    let status = existing.status.get_or_insert_with(ClusterStatus::default);
    status.phase = Phase::Updating;
    status.conditions.clear();
    Ok(existing.clone())
}

pub async fn delete_cluster(client: &MockFleetClient, id: &ClusterIdentity) -> Result<(), FleetError> {
    client.record(MockOp::DeleteCluster, &id.cluster_name)?;

    {
        let mut clusters = client.clusters.lock().unwrap();
        let Some(cluster) = clusters.get_mut(id) else {
            return Err(FleetError::NotFound(format!("Cluster {} not found", id)));
        };
        if client.begin_delete(&id.cluster_name) {
            if let Some(status) = cluster.status.as_mut() {
                status.phase = Phase::Deleting;
            }
            return Ok(());
        }
    }

    remove_cluster(client, id);
    Ok(())
}

/// Drop a cluster together with every node pool it owns
fn remove_cluster(client: &MockFleetClient, id: &ClusterIdentity) {
    client.clusters.lock().unwrap().remove(id);
    client
        .node_pools
        .lock()
        .unwrap()
        .retain(|pool_id, _| !pool_id.belongs_to(id));
}
