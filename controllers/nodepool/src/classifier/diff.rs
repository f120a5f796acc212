//! Structural diff producing changed field paths.
//!
//! Each model type spells out its own fields, so the paths are stable and
//! independent of serde renames: `Spec.VMSize`, `Spec.Taints[0].Effect`,
//! `Spec.Labels[team]`, `FullName.Name`.

use std::collections::{BTreeMap, BTreeSet};

use fleet_client::{
    NetworkPlacement, NodePool, NodePoolIdentity, NodePoolMode, NodePoolSpec, OsDiskType, OsType,
    ScaleSetEvictionPolicy, ScaleSetPriority, ScalingConfig, Taint, TaintEffect, UpgradeConfig,
};

/// Compare two values of the same shape and collect the paths that differ.
pub trait FieldDiff {
    fn diff_into(&self, other: &Self, path: &str, changes: &mut Vec<String>);
}

fn child(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    }
}

macro_rules! leaf_diff {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FieldDiff for $ty {
                fn diff_into(&self, other: &Self, path: &str, changes: &mut Vec<String>) {
                    if self != other {
                        changes.push(path.to_string());
                    }
                }
            }
        )*
    };
}

leaf_diff!(
    String,
    u32,
    bool,
    f64,
    NodePoolMode,
    OsType,
    OsDiskType,
    ScaleSetPriority,
    ScaleSetEvictionPolicy,
    TaintEffect,
);

impl<T: FieldDiff> FieldDiff for Option<T> {
    fn diff_into(&self, other: &Self, path: &str, changes: &mut Vec<String>) {
        match (self, other) {
            (Some(a), Some(b)) => a.diff_into(b, path, changes),
            (None, None) => {}
            _ => changes.push(path.to_string()),
        }
    }
}

impl<T: FieldDiff> FieldDiff for Vec<T> {
    fn diff_into(&self, other: &Self, path: &str, changes: &mut Vec<String>) {
        for i in 0..self.len().max(other.len()) {
            let item_path = format!("{}[{}]", path, i);
            match (self.get(i), other.get(i)) {
                (Some(a), Some(b)) => a.diff_into(b, &item_path, changes),
                _ => changes.push(item_path),
            }
        }
    }
}

impl<T: FieldDiff> FieldDiff for BTreeMap<String, T> {
    fn diff_into(&self, other: &Self, path: &str, changes: &mut Vec<String>) {
        let keys: BTreeSet<&String> = self.keys().chain(other.keys()).collect();
        for key in keys {
            let item_path = format!("{}[{}]", path, key);
            match (self.get(key), other.get(key)) {
                (Some(a), Some(b)) => a.diff_into(b, &item_path, changes),
                _ => changes.push(item_path),
            }
        }
    }
}

impl FieldDiff for Taint {
    fn diff_into(&self, other: &Self, path: &str, changes: &mut Vec<String>) {
        self.key.diff_into(&other.key, &child(path, "Key"), changes);
        self.value.diff_into(&other.value, &child(path, "Value"), changes);
        self.effect.diff_into(&other.effect, &child(path, "Effect"), changes);
    }
}

impl FieldDiff for ScalingConfig {
    fn diff_into(&self, other: &Self, path: &str, changes: &mut Vec<String>) {
        self.enabled.diff_into(&other.enabled, &child(path, "Enabled"), changes);
        self.min_count.diff_into(&other.min_count, &child(path, "MinCount"), changes);
        self.max_count.diff_into(&other.max_count, &child(path, "MaxCount"), changes);
        self.priority.diff_into(&other.priority, &child(path, "Priority"), changes);
        self.eviction_policy
            .diff_into(&other.eviction_policy, &child(path, "EvictionPolicy"), changes);
        self.spot_max_price
            .diff_into(&other.spot_max_price, &child(path, "SpotMaxPrice"), changes);
    }
}

impl FieldDiff for NetworkPlacement {
    fn diff_into(&self, other: &Self, path: &str, changes: &mut Vec<String>) {
        self.vnet_subnet_id
            .diff_into(&other.vnet_subnet_id, &child(path, "VnetSubnetID"), changes);
        self.pod_subnet_id
            .diff_into(&other.pod_subnet_id, &child(path, "PodSubnetID"), changes);
    }
}

impl FieldDiff for UpgradeConfig {
    fn diff_into(&self, other: &Self, path: &str, changes: &mut Vec<String>) {
        self.max_surge.diff_into(&other.max_surge, &child(path, "MaxSurge"), changes);
    }
}

impl FieldDiff for NodePoolSpec {
    fn diff_into(&self, other: &Self, path: &str, changes: &mut Vec<String>) {
        self.mode.diff_into(&other.mode, &child(path, "Mode"), changes);
        self.vm_size.diff_into(&other.vm_size, &child(path, "VMSize"), changes);
        self.os_type.diff_into(&other.os_type, &child(path, "OsType"), changes);
        self.os_disk_type.diff_into(&other.os_disk_type, &child(path, "OsDiskType"), changes);
        self.os_disk_size_gb
            .diff_into(&other.os_disk_size_gb, &child(path, "OsDiskSizeGB"), changes);
        self.max_pods.diff_into(&other.max_pods, &child(path, "MaxPods"), changes);
        self.availability_zones
            .diff_into(&other.availability_zones, &child(path, "AvailabilityZones"), changes);
        self.kubernetes_version
            .diff_into(&other.kubernetes_version, &child(path, "KubernetesVersion"), changes);
        self.count.diff_into(&other.count, &child(path, "Count"), changes);
        self.scaling.diff_into(&other.scaling, &child(path, "Scaling"), changes);
        self.network.diff_into(&other.network, &child(path, "Network"), changes);
        self.labels.diff_into(&other.labels, &child(path, "Labels"), changes);
        self.tags.diff_into(&other.tags, &child(path, "Tags"), changes);
        self.taints.diff_into(&other.taints, &child(path, "Taints"), changes);
        self.upgrade.diff_into(&other.upgrade, &child(path, "Upgrade"), changes);
    }
}

impl FieldDiff for NodePoolIdentity {
    fn diff_into(&self, other: &Self, path: &str, changes: &mut Vec<String>) {
        self.credential_name
            .diff_into(&other.credential_name, &child(path, "CredentialName"), changes);
        self.subscription_id
            .diff_into(&other.subscription_id, &child(path, "SubscriptionID"), changes);
        self.resource_group_name
            .diff_into(&other.resource_group_name, &child(path, "ResourceGroupName"), changes);
        self.cluster_name
            .diff_into(&other.cluster_name, &child(path, "ClusterName"), changes);
        self.name.diff_into(&other.name, &child(path, "Name"), changes);
    }
}

/// Status is owned by the service and never part of the diff
impl FieldDiff for NodePool {
    fn diff_into(&self, other: &Self, path: &str, changes: &mut Vec<String>) {
        self.full_name.diff_into(&other.full_name, &child(path, "FullName"), changes);
        self.spec.diff_into(&other.spec, &child(path, "Spec"), changes);
    }
}

/// Paths that differ between `a` and `b`, in field order
pub fn diff_paths<T: FieldDiff>(a: &T, b: &T) -> Vec<String> {
    let mut changes = Vec::new();
    a.diff_into(b, "", &mut changes);
    changes
}
