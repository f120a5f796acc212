//! Unit tests for poller module
//!
//! The clock is paused, so sleeps resolve instantly while `Instant` still
//! advances by the slept amount.

use super::*;
use crate::test_utils::*;
use fleet_client::{FleetClientTrait, MockFailure, MockOp};
use tokio::time::Instant;

fn obs(phase: Phase) -> Observation {
    Observation {
        phase,
        detail: "Ready (ProvisioningFailed): quota exceeded".to_string(),
    }
}

#[test]
fn test_evaluate_await_ready() {
    assert_eq!(evaluate(WaitTarget::Ready, Some(&obs(Phase::Ready))), PollState::Ready);
    assert_eq!(evaluate(WaitTarget::Ready, Some(&obs(Phase::Creating))), PollState::Waiting);
    assert_eq!(evaluate(WaitTarget::Ready, Some(&obs(Phase::UpgradeFailed))), PollState::Waiting);
    assert_eq!(
        evaluate(WaitTarget::Ready, None),
        PollState::FatalError("entry not found".to_string())
    );
    match evaluate(WaitTarget::Ready, Some(&obs(Phase::Error))) {
        PollState::FatalError(detail) => assert!(detail.contains("quota exceeded")),
        other => panic!("Expected fatal error, got {:?}", other),
    }
}

#[test]
fn test_evaluate_await_deleted() {
    assert_eq!(evaluate(WaitTarget::Deleted, None), PollState::NotFound);
    assert_eq!(evaluate(WaitTarget::Deleted, Some(&obs(Phase::Deleting))), PollState::Waiting);
    // An errored resource is still there
    assert_eq!(evaluate(WaitTarget::Deleted, Some(&obs(Phase::Error))), PollState::Waiting);
}

#[tokio::test(start_paused = true)]
async fn test_times_out_at_deadline() {
    let mock = mock_client();
    let pool = user_pool("stuck");
    mock.add_node_pool(pool.clone());
    mock.script_phases("stuck", [Phase::Creating]);

    let poller = Poller::new(PollConfig::new(Duration::from_secs(1), Duration::from_secs(2)));
    let started = Instant::now();
    let err = poller
        .await_node_pool_ready(&mock, &pool.full_name)
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, ControllerError::TimedOut { target: WaitTarget::Ready, .. }), "{}", err);
    assert!(err.to_string().starts_with("timed out waiting for ready"), "{}", err);
    assert!(elapsed >= Duration::from_secs(2), "returned too early: {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(3), "returned too late: {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_waits_until_ready() {
    let mock = mock_client();
    let pool = user_pool("workers");
    mock.add_node_pool(pool.clone());
    mock.script_phases("workers", [Phase::Creating, Phase::Creating, Phase::Ready]);

    let poller = Poller::new(test_poll_config());
    let started = Instant::now();
    poller
        .await_node_pool_ready(&mock, &pool.full_name)
        .await
        .unwrap();

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(3) && elapsed < Duration::from_secs(4), "{:?}", elapsed);
    let gets = mock.calls().iter().filter(|c| c.op == MockOp::GetNodePool).count();
    assert_eq!(gets, 3);
}

#[tokio::test(start_paused = true)]
async fn test_error_phase_is_fatal_with_detail() {
    let mock = mock_client();
    let pool = user_pool("workers");
    mock.add_node_pool(pool.clone());
    mock.script_phases("workers", [Phase::Creating]);
    mock.script_failure("workers", "SKU not available in region");

    let err = Poller::new(test_poll_config())
        .await_node_pool_ready(&mock, &pool.full_name)
        .await
        .unwrap_err();

    match &err {
        ControllerError::FatalPoll { detail, .. } => {
            assert!(detail.contains("SKU not available in region"), "{}", detail);
        }
        other => panic!("Expected FatalPoll, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_missing_pool_while_awaiting_ready_is_fatal() {
    let mock = mock_client();
    let pool = user_pool("ghost");

    let err = Poller::new(test_poll_config())
        .await_node_pool_ready(&mock, &pool.full_name)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("entry not found"), "{}", err);
}

#[tokio::test(start_paused = true)]
async fn test_await_deleted_until_not_found() {
    let mock = mock_client();
    let pool = user_pool("old");
    mock.add_node_pool(pool.clone());
    mock.delay_delete("old", 2);
    mock.delete_node_pool(&pool.full_name).await.unwrap();

    let started = Instant::now();
    Poller::new(test_poll_config())
        .await_node_pool_deleted(&mock, &pool.full_name)
        .await
        .unwrap();

    // Two DELETING observations, then gone
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(3) && elapsed < Duration::from_secs(4), "{:?}", elapsed);
    assert!(mock.node_pool("old").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_fetch_failure_aborts_wait() {
    let mock = mock_client();
    let pool = user_pool("workers");
    mock.add_node_pool(pool.clone());
    mock.fail_on(MockOp::GetNodePool, "workers", MockFailure::Api("503 unavailable".to_string()));

    let err = Poller::new(test_poll_config())
        .await_node_pool_ready(&mock, &pool.full_name)
        .await
        .unwrap_err();

    assert!(matches!(err, ControllerError::RemoteCall { .. }), "{}", err);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_stops_wait() {
    let mock = mock_client();
    let pool = user_pool("stuck");
    mock.add_node_pool(pool.clone());
    mock.script_phases("stuck", [Phase::Creating]);

    let token = CancellationToken::new();
    let poller = Poller::with_cancellation(test_poll_config(), token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        token.cancel();
    });

    let started = Instant::now();
    let err = poller
        .await_node_pool_ready(&mock, &pool.full_name)
        .await
        .unwrap_err();
    canceller.await.unwrap();

    assert!(matches!(err, ControllerError::Cancelled { .. }), "{}", err);
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_cluster_ready_wait() {
    let mock = mock_client();
    let cluster = test_cluster();
    mock.create_cluster(&cluster).await.unwrap();
    mock.script_phases(&cluster.full_name.cluster_name, [Phase::Creating, Phase::Ready]);

    Poller::new(test_poll_config())
        .await_cluster_ready(&mock, &cluster.full_name)
        .await
        .unwrap();
}
