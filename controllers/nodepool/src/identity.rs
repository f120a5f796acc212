//! Node pool identity.
//!
//! A pool is addressed by its cluster's identity plus the pool name. Within one
//! reconciliation pass every pool shares the cluster part, so desired and
//! existing pools are matched on the name alone.

use fleet_client::{ClusterIdentity, NodePool, NodePoolIdentity};

/// Identity of `pool_name` inside `cluster`
pub fn build_identity(cluster: &ClusterIdentity, pool_name: &str) -> NodePoolIdentity {
    NodePoolIdentity {
        credential_name: cluster.credential_name.clone(),
        subscription_id: cluster.subscription_id.clone(),
        resource_group_name: cluster.resource_group_name.clone(),
        cluster_name: cluster.cluster_name.clone(),
        name: pool_name.to_string(),
    }
}

/// Whether two pools address the same remote pool within one pass
pub fn same_pool(a: &NodePool, b: &NodePool) -> bool {
    a.full_name.name == b.full_name.name
}

/// Counterpart of `pool` in `candidates`, if any
pub fn find_match<'a>(pool: &NodePool, candidates: &'a [NodePool]) -> Option<&'a NodePool> {
    candidates.iter().find(|c| same_pool(pool, c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{test_cluster_identity, user_pool};

    #[test]
    fn test_build_identity_copies_cluster_fields() {
        let cluster = test_cluster_identity();
        let id = build_identity(&cluster, "workers");

        assert_eq!(id.name, "workers");
        assert_eq!(id.cluster(), cluster);
        assert!(id.belongs_to(&cluster));
    }

    #[test]
    fn test_match_ignores_cluster_fields() {
        let a = user_pool("workers");
        let mut b = user_pool("workers");
        b.full_name.credential_name = "other-credential".to_string();

        assert!(same_pool(&a, &b));
        assert!(find_match(&a, &[user_pool("other"), b]).is_some());
        assert!(find_match(&a, &[user_pool("other")]).is_none());
    }
}
