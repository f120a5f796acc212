//! Change classification.
//!
//! Decides, for one desired pool and its existing counterpart, which remote
//! operation brings them in line.

mod diff;

pub use diff::{FieldDiff, diff_paths};

use fleet_client::NodePool;
use std::fmt;

/// Field paths the service cannot change on an existing pool.
///
/// This mirrors the remote API's mutability contract; editing it changes
/// which updates turn into delete-and-recreate.
pub const IMMUTABLE_FIELDS: &[&str] = &[
    "FullName.Name",
    "Spec.VMSize",
    "Spec.OsType",
    "Spec.OsDiskType",
    "Spec.OsDiskSizeGB",
    "Spec.MaxPods",
    "Spec.AvailabilityZones",
    "Spec.Network.VnetSubnetID",
    "Spec.Network.PodSubnetID",
    "Spec.Scaling.Priority",
    "Spec.Scaling.EvictionPolicy",
    "Spec.Scaling.SpotMaxPrice",
];

/// Remote operation required for one pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    NoOp,
    Create,
    Update,
    DeleteAndRecreate,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::NoOp => "no-op",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::DeleteAndRecreate => "delete-and-recreate",
            Operation::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// Same declared configuration; status and timestamps don't count
pub fn identical(desired: &NodePool, existing: &NodePool) -> bool {
    desired.spec == existing.spec
}

/// Every field path that differs between `desired` and `existing`
pub fn changed_fields(desired: &NodePool, existing: &NodePool) -> Vec<String> {
    diff_paths(desired, existing)
}

/// Whether `path` is an immutable field or lies underneath one
pub fn is_immutable_path(path: &str) -> bool {
    IMMUTABLE_FIELDS.iter().any(|immutable| {
        path.strip_prefix(immutable)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('.') || rest.starts_with('['))
    })
}

/// Changed paths that can only be applied by recreating the pool
pub fn immutable_changes(desired: &NodePool, existing: &NodePool) -> Vec<String> {
    changed_fields(desired, existing)
        .into_iter()
        .filter(|path| is_immutable_path(path))
        .collect()
}

pub fn has_immutable_change(desired: &NodePool, existing: &NodePool) -> bool {
    !immutable_changes(desired, existing).is_empty()
}

/// Operation for a desired pool given its existing match, if any
pub fn classify(desired: &NodePool, existing: Option<&NodePool>) -> Operation {
    match existing {
        None => Operation::Create,
        Some(existing) if identical(desired, existing) => Operation::NoOp,
        Some(existing) if has_immutable_change(desired, existing) => Operation::DeleteAndRecreate,
        Some(_) => Operation::Update,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ready, subnet, user_pool};
    use fleet_client::{OsDiskType, Taint};

    #[test]
    fn test_missing_existing_is_create() {
        assert_eq!(classify(&user_pool("a"), None), Operation::Create);
    }

    #[test]
    fn test_identical_spec_is_noop() {
        let existing = ready(user_pool("a"));
        assert_eq!(classify(&user_pool("a"), Some(&existing)), Operation::NoOp);
    }

    #[test]
    fn test_vm_size_change_recreates() {
        let existing = ready(user_pool("a"));
        let mut desired = user_pool("a");
        desired.spec.vm_size = "STANDARD_DS2v3".to_string();

        assert_eq!(immutable_changes(&desired, &existing), vec!["Spec.VMSize"]);
        assert_eq!(classify(&desired, Some(&existing)), Operation::DeleteAndRecreate);
    }

    #[test]
    fn test_os_disk_and_subnet_changes_recreate() {
        let existing = ready(user_pool("a"));

        let mut desired = user_pool("a");
        desired.spec.os_disk_type = OsDiskType::Ephemeral;
        assert_eq!(classify(&desired, Some(&existing)), Operation::DeleteAndRecreate);

        let mut desired = user_pool("a");
        desired.spec.network.vnet_subnet_id = Some(subnet("nodes"));
        assert_eq!(classify(&desired, Some(&existing)), Operation::DeleteAndRecreate);
    }

    #[test]
    fn test_zone_element_change_recreates() {
        let mut existing = ready(user_pool("a"));
        existing.spec.availability_zones = vec!["1".to_string(), "2".to_string()];
        let mut desired = user_pool("a");
        desired.spec.availability_zones = vec!["1".to_string(), "3".to_string()];

        assert_eq!(changed_fields(&desired, &existing), vec!["Spec.AvailabilityZones[1]"]);
        assert_eq!(classify(&desired, Some(&existing)), Operation::DeleteAndRecreate);
    }

    #[test]
    fn test_mutable_changes_update() {
        let existing = ready(user_pool("a"));

        let mut desired = user_pool("a");
        desired.spec.count = 5;
        assert_eq!(classify(&desired, Some(&existing)), Operation::Update);

        let mut desired = user_pool("a");
        desired.spec.tags.insert("env".to_string(), "prod".to_string());
        assert_eq!(classify(&desired, Some(&existing)), Operation::Update);

        let mut desired = user_pool("a");
        desired.spec.taints.push(Taint {
            key: "dedicated".to_string(),
            value: "batch".to_string(),
            ..Default::default()
        });
        assert_eq!(classify(&desired, Some(&existing)), Operation::Update);
    }

    #[test]
    fn test_immutable_prefix_matching_is_segment_aware() {
        assert!(is_immutable_path("Spec.VMSize"));
        assert!(is_immutable_path("Spec.AvailabilityZones[0]"));
        assert!(!is_immutable_path("Spec.VMSizeHint"));
        assert!(!is_immutable_path("Spec.Count"));
        assert!(!is_immutable_path("Spec.Scaling.MaxCount"));
    }
}
