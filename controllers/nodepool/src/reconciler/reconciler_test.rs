//! Unit tests for steady-state reconciliation

use super::*;
use crate::test_utils::*;
use fleet_client::{MockCall, MockFailure, MockOp, NetworkPlugin, Phase};

fn ops(plan: &[PlannedOperation]) -> Vec<String> {
    plan.iter().map(ToString::to_string).collect()
}

#[test]
fn test_plan_covers_every_operation_kind() {
    let existing = vec![
        ready(system_pool("sys")),
        ready(user_pool("big")),
        ready(user_pool("gpu")),
        ready(user_pool("legacy")),
    ];

    let mut big = user_pool("big");
    big.spec.count = 5;
    let mut gpu = user_pool("gpu");
    gpu.spec.vm_size = "STANDARD_NC6".to_string();
    let desired = vec![user_pool("new"), gpu, big, system_pool("sys")];

    assert_eq!(
        ops(&plan(&desired, &existing)),
        vec![
            "create new",
            "delete-and-recreate gpu",
            "update big",
            "no-op sys",
            "delete legacy",
        ]
    );
}

#[test]
fn test_plan_deletes_after_desired_regardless_of_order() {
    let existing = vec![ready(user_pool("a-old")), ready(user_pool("m"))];
    let desired = vec![user_pool("z-new"), user_pool("m")];

    let plan = plan(&desired, &existing);
    assert_eq!(ops(&plan), vec!["create z-new", "no-op m", "delete a-old"]);
    assert_eq!(plan.last().map(PlannedOperation::operation), Some(Operation::Delete));
}

#[tokio::test(start_paused = true)]
async fn test_identical_pools_issue_no_mutations() {
    let mock = mock_client();
    mock.add_node_pool(ready(system_pool("sys")));
    mock.add_node_pool(ready(user_pool("workers")));

    let summary = test_reconciler(&mock)
        .reconcile(&test_cluster(), &[system_pool("sys"), user_pool("workers")])
        .await
        .unwrap();

    assert!(summary.is_converged());
    assert_eq!(summary.unchanged, vec!["sys", "workers"]);
    assert_eq!(mock.calls(), vec![MockCall::new(MockOp::ListNodePools, "aks-test")]);
}

#[tokio::test(start_paused = true)]
async fn test_missing_pool_is_created_once() {
    let mock = mock_client();
    mock.add_node_pool(ready(system_pool("sys")));

    let summary = test_reconciler(&mock)
        .reconcile(&test_cluster(), &[system_pool("sys"), user_pool("workers")])
        .await
        .unwrap();

    assert_eq!(summary.created, vec!["workers"]);
    assert_eq!(mock.mutations(), vec![MockCall::create_node_pool("workers")]);
    assert_eq!(mock.node_pool("workers").and_then(|p| p.phase()), Some(Phase::Ready));
}

#[tokio::test(start_paused = true)]
async fn test_undeclared_pool_is_deleted_once() {
    let mock = mock_client();
    mock.add_node_pool(ready(system_pool("sys")));
    mock.add_node_pool(ready(user_pool("old")));
    mock.delay_delete("old", 1);

    let summary = test_reconciler(&mock)
        .reconcile(&test_cluster(), &[system_pool("sys")])
        .await
        .unwrap();

    assert_eq!(summary.deleted, vec!["old"]);
    assert_eq!(mock.mutations(), vec![MockCall::delete_node_pool("old")]);
    assert_eq!(mock.node_pool_names(), vec!["sys"]);
}

#[tokio::test(start_paused = true)]
async fn test_vm_size_change_deletes_then_creates() {
    let mock = mock_client();
    mock.add_node_pool(ready(system_pool("sys")));
    mock.add_node_pool(ready(user_pool("workers")));

    let mut desired = user_pool("workers");
    desired.spec.vm_size = "STANDARD_DS2v3".to_string();

    let summary = test_reconciler(&mock)
        .reconcile(&test_cluster(), &[system_pool("sys"), desired])
        .await
        .unwrap();

    assert_eq!(summary.recreated, vec!["workers"]);
    assert_eq!(
        mock.mutations(),
        vec![
            MockCall::delete_node_pool("workers"),
            MockCall::create_node_pool("workers"),
        ]
    );
    let stored = mock.node_pool("workers").unwrap();
    assert_eq!(stored.spec.vm_size, "STANDARD_DS2v3");
}

#[tokio::test(start_paused = true)]
async fn test_failed_delete_never_recreates() {
    let mock = mock_client();
    mock.add_node_pool(ready(user_pool("workers")));
    mock.fail_on(MockOp::DeleteNodePool, "workers", MockFailure::Api("conflict".to_string()));

    let mut desired = user_pool("workers");
    desired.spec.vm_size = "STANDARD_DS2v3".to_string();

    let err = test_reconciler(&mock)
        .reconcile(&test_cluster(), &[desired])
        .await
        .unwrap_err();

    assert!(matches!(err, ControllerError::RemoteCall { .. }), "{}", err);
    assert_eq!(mock.mutations(), vec![MockCall::delete_node_pool("workers")]);
    assert_eq!(mock.node_pool("workers").unwrap().spec.vm_size, "STANDARD_DS2v2");
}

#[tokio::test(start_paused = true)]
async fn test_mutable_changes_update_in_place() {
    let mock = mock_client();
    mock.add_node_pool(ready(user_pool("scaled")));
    mock.add_node_pool(ready(user_pool("tagged")));

    let mut scaled = user_pool("scaled");
    scaled.spec.count = 5;
    let mut tagged = user_pool("tagged");
    tagged.spec.tags.insert("env".to_string(), "prod".to_string());

    let summary = test_reconciler(&mock)
        .reconcile(&test_cluster(), &[scaled, tagged])
        .await
        .unwrap();

    assert_eq!(summary.updated, vec!["scaled", "tagged"]);
    assert_eq!(
        mock.mutations(),
        vec![
            MockCall::update_node_pool("scaled"),
            MockCall::update_node_pool("tagged"),
        ]
    );
    assert_eq!(mock.node_pool("scaled").unwrap().spec.count, 5);
}

#[tokio::test(start_paused = true)]
async fn test_second_pass_is_idempotent() {
    let mock = mock_client();
    mock.add_node_pool(ready(user_pool("legacy")));

    let mut workers = user_pool("workers");
    workers.spec.labels.insert("team".to_string(), "data".to_string());
    let desired = vec![system_pool("sys"), workers];

    let reconciler = test_reconciler(&mock);
    let first = reconciler.reconcile(&test_cluster(), &desired).await.unwrap();
    assert!(!first.is_converged());

    mock.clear_calls();
    let second = reconciler.reconcile(&test_cluster(), &desired).await.unwrap();

    assert!(second.is_converged(), "{}", second);
    assert!(mock.mutations().is_empty(), "{:?}", mock.mutations());
}

#[tokio::test(start_paused = true)]
async fn test_invalid_config_makes_no_remote_calls() {
    let mock = mock_client();
    let mut cluster = test_cluster();
    cluster.spec.network = network(NetworkPlugin::Kubenet, false);

    let mut pool = user_pool("workers");
    pool.spec.network.vnet_subnet_id = Some(subnet("nodes"));
    pool.spec.network.pod_subnet_id = Some(subnet("pods"));

    let err = test_reconciler(&mock)
        .reconcile(&cluster, &[pool])
        .await
        .unwrap_err();

    assert!(matches!(err, ControllerError::Configuration(_)), "{}", err);
    assert!(mock.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_deletions_run_after_desired_operations() {
    let mock = mock_client();
    mock.add_node_pool(ready(user_pool("a-old")));

    test_reconciler(&mock)
        .reconcile(&test_cluster(), &[user_pool("z-new")])
        .await
        .unwrap();

    assert_eq!(
        mock.mutations(),
        vec![
            MockCall::create_node_pool("z-new"),
            MockCall::delete_node_pool("a-old"),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_already_deleted_pool_counts_as_deleted() {
    let mock = mock_client();
    mock.add_node_pool(ready(user_pool("old")));
    mock.fail_on(MockOp::DeleteNodePool, "old", MockFailure::NotFound);

    let summary = test_reconciler(&mock)
        .reconcile(&test_cluster(), &[])
        .await
        .unwrap();

    assert_eq!(summary.deleted, vec!["old"]);
    // No wait for a pool that is already gone
    assert!(!mock.calls().iter().any(|c| c.op == MockOp::GetNodePool));
}

#[tokio::test(start_paused = true)]
async fn test_poll_failure_aborts_remaining_plan() {
    let mock = mock_client();
    mock.script_failure("a", "allocation failed: quota exceeded");

    let err = test_reconciler(&mock)
        .reconcile(&test_cluster(), &[user_pool("a"), user_pool("b")])
        .await
        .unwrap_err();

    assert!(err.to_string().contains("quota exceeded"), "{}", err);
    assert_eq!(mock.mutations(), vec![MockCall::create_node_pool("a")]);
}

#[tokio::test(start_paused = true)]
async fn test_update_that_never_settles_times_out() {
    let mock = mock_client();
    mock.add_node_pool(ready(user_pool("a")));
    mock.script_phases("a", [Phase::Updating]);

    let mut desired = user_pool("a");
    desired.spec.count = 3;

    let err = test_reconciler(&mock)
        .reconcile(&test_cluster(), &[desired])
        .await
        .unwrap_err();

    assert!(matches!(err, ControllerError::TimedOut { .. }), "{}", err);
    assert!(err.is_retryable());
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_reconciler_stops_at_first_wait() {
    let mock = mock_client();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = test_reconciler(&mock)
        .with_cancellation(cancel)
        .reconcile(&test_cluster(), &[user_pool("a"), user_pool("b")])
        .await
        .unwrap_err();

    assert!(matches!(err, ControllerError::Cancelled { .. }), "{}", err);
    assert_eq!(mock.mutations(), vec![MockCall::create_node_pool("a")]);
}

#[tokio::test(start_paused = true)]
async fn test_desired_pools_are_scoped_to_the_cluster() {
    let mock = mock_client();
    mock.add_node_pool(ready(user_pool("workers")));

    let mut foreign = user_pool("workers");
    foreign.full_name.cluster_name = "somewhere-else".to_string();

    let summary = test_reconciler(&mock)
        .reconcile(&test_cluster(), &[foreign])
        .await
        .unwrap();

    assert_eq!(summary.unchanged, vec!["workers"]);
}
