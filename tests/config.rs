mod common;

use std::time::Duration;

use common::TestHarness;
use rsshub::ErrorKind;

#[tokio::test]
async fn set_interval_below_the_floor_is_rejected() {
    let harness = TestHarness::new();

    let err = harness
        .aggregator
        .set_interval(Duration::from_secs(60))
        .await
        .expect_err("sub-2-minute interval should be rejected");
    assert_eq!(err.kind(), Some(ErrorKind::InvalidInterval));
}

#[tokio::test]
async fn set_interval_at_or_above_the_floor_is_persisted() {
    let harness = TestHarness::new();

    harness
        .aggregator
        .set_interval(Duration::from_secs(180))
        .await
        .expect("3-minute interval should be accepted");

    let config = harness.aggregator.get_config().await.expect("get_config should succeed");
    assert_eq!(config.poll_period(), Duration::from_secs(180));
}

#[tokio::test]
async fn resize_out_of_bounds_is_rejected() {
    let harness = TestHarness::new();

    assert_eq!(
        harness.aggregator.resize(0).await.expect_err("0 workers should be rejected").kind(),
        Some(ErrorKind::InvalidWorkerCount)
    );
    assert_eq!(
        harness
            .aggregator
            .resize(10_001)
            .await
            .expect_err("10001 workers should be rejected")
            .kind(),
        Some(ErrorKind::InvalidWorkerCount)
    );
}

#[tokio::test]
async fn resize_at_the_bounds_is_accepted() {
    let harness = TestHarness::new();

    harness.aggregator.resize(1).await.expect("1 worker should be accepted");
    harness.aggregator.resize(10_000).await.expect("10000 workers should be accepted");
}

#[tokio::test]
async fn starting_twice_reports_already_running() {
    let harness = TestHarness::new();

    harness.aggregator.start().await.expect("first start should succeed");
    let err = harness
        .aggregator
        .start()
        .await
        .expect_err("starting twice should fail");
    assert_eq!(err.kind(), Some(ErrorKind::ProcessAlreadyRunning));

    harness.aggregator.stop().await.expect("stop should succeed");
}
