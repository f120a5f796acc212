//! Pre-flight validation.
//!
//! Cross-field networking rules the fleet service would reject anyway. Every
//! check runs before the first remote call so a bad configuration never leaves
//! partial side effects behind.

use std::collections::HashSet;

use fleet_client::{ClusterNetworkSpec, NetworkPlugin, NodePool};

use crate::error::ControllerError;

const SUBNETS_SEGMENT: &str = "/subnets/";

/// Check the cluster-wide network plugin settings.
///
/// Overlay mode only exists for the azure plugin, and a pod CIDR only means
/// something to azure when overlay is on.
pub fn validate_cluster_network(network: &ClusterNetworkSpec) -> Result<(), ControllerError> {
    if network.is_overlay() && network.network_plugin != NetworkPlugin::Azure {
        return Err(ControllerError::Configuration(format!(
            "network plugin mode 'overlay' requires network plugin 'azure', got '{}'",
            network.network_plugin
        )));
    }

    if network.network_plugin == NetworkPlugin::Azure
        && !network.is_overlay()
        && non_empty(network.pod_cidr.as_deref()).is_some()
    {
        return Err(ControllerError::Configuration(
            "pod CIDR cannot be set with network plugin 'azure' unless network plugin mode is 'overlay'"
                .to_string(),
        ));
    }

    Ok(())
}

/// Check one pool's subnet placement against the cluster networking mode.
pub fn validate_node_pool_network(
    network: &ClusterNetworkSpec,
    pool: &NodePool,
) -> Result<(), ControllerError> {
    let node_subnet = non_empty(pool.spec.network.vnet_subnet_id.as_deref());
    let Some(pod_subnet) = non_empty(pool.spec.network.pod_subnet_id.as_deref()) else {
        return Ok(());
    };

    // Dedicated pod subnets only exist for azure CNI without overlay
    if network.network_plugin != NetworkPlugin::Azure || network.is_overlay() {
        let mode = if network.is_overlay() {
            format!("{} with overlay", network.network_plugin)
        } else {
            network.network_plugin.to_string()
        };
        return Err(ControllerError::Configuration(format!(
            "node pool '{}': pod subnet cannot be used with network plugin {}; \
             it requires network plugin 'azure' without overlay mode",
            pool.name(),
            mode
        )));
    }

    let Some(node_subnet) = node_subnet else {
        return Err(ControllerError::Configuration(format!(
            "node pool '{}': pod subnet requires a node (vnet) subnet to be set",
            pool.name()
        )));
    };

    if node_subnet == pod_subnet {
        return Err(ControllerError::Configuration(format!(
            "node pool '{}': node subnet and pod subnet must differ, both are '{}'",
            pool.name(),
            node_subnet
        )));
    }

    let node_vnet = vnet_id_from_subnet_id(node_subnet)?;
    let pod_vnet = vnet_id_from_subnet_id(pod_subnet)?;
    if node_vnet != pod_vnet {
        return Err(ControllerError::Configuration(format!(
            "node pool '{}': node subnet and pod subnet must be in the same virtual network, \
             got '{}' and '{}'",
            pool.name(),
            node_vnet,
            pod_vnet
        )));
    }

    Ok(())
}

/// Parent virtual network of a subnet resource id.
///
/// `/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/v/subnets/a`
/// yields everything before `/subnets/`.
pub fn vnet_id_from_subnet_id(subnet_id: &str) -> Result<&str, ControllerError> {
    subnet_id
        .find(SUBNETS_SEGMENT)
        .map(|idx| &subnet_id[..idx])
        .ok_or_else(|| {
            ControllerError::Configuration(format!(
                "cannot read vNet id from subnet id '{}'",
                subnet_id
            ))
        })
}

/// Cluster bring-up needs somewhere to run system workloads
pub fn require_system_pool(desired: &[NodePool]) -> Result<(), ControllerError> {
    if desired.iter().any(NodePool::is_system) {
        Ok(())
    } else {
        Err(ControllerError::Configuration(
            "at least one node pool with mode SYSTEM is required".to_string(),
        ))
    }
}

/// Every rule that applies to a desired set, in one pass.
///
/// Pool names must be unique since they are the matching key.
pub fn validate_desired(
    network: &ClusterNetworkSpec,
    desired: &[NodePool],
) -> Result<(), ControllerError> {
    validate_cluster_network(network)?;

    let mut seen = HashSet::new();
    for pool in desired {
        if !seen.insert(pool.name()) {
            return Err(ControllerError::Configuration(format!(
                "node pool '{}' is declared more than once",
                pool.name()
            )));
        }
        validate_node_pool_network(network, pool)?;
    }
    Ok(())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "validation_test.rs"]
mod validation_test;
