//! Tests for QueryExecutor: submission, polling, completion and failure paths.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use lake_athena::*;

use crate::fakes::{request, ScriptedEngine, TimedEngine, OUTPUT};

fn executor(engine: Arc<ScriptedEngine>) -> (QueryExecutor, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    (QueryExecutor::with_clock(engine, clock.clone()), clock)
}

#[tokio::test]
async fn immediate_poll_after_submit_is_not_failed() {
    for first in [QueryStatus::Submitted, QueryStatus::Running, QueryStatus::Succeeded] {
        let engine = Arc::new(ScriptedEngine::new(&[first]));
        let (exec, _) = executor(engine.clone());

        let handle = exec.submit(&request()).await.unwrap();
        let status = exec.poll(&handle).await.unwrap();
        assert!(
            matches!(status, QueryStatus::Submitted | QueryStatus::Running | QueryStatus::Succeeded),
            "unexpected {status}"
        );
    }
}

#[tokio::test]
async fn n_running_polls_then_success_issues_n_plus_one_polls() {
    for n in [0usize, 1, 5] {
        let engine = Arc::new(ScriptedEngine::running_then_succeeded(n));
        let (exec, clock) = executor(engine.clone());

        let handle = exec.submit(&request()).await.unwrap();
        let artifact = exec
            .await_completion(&handle, &WaitOptions::fixed(Duration::from_secs(2)))
            .await
            .unwrap();

        assert_eq!(engine.polls(), n + 1);
        assert_eq!(artifact.uri(), format!("{}{}.csv", OUTPUT, handle.id()));
        // One sleep per non-terminal read.
        assert_eq!(clock.elapsed(), Duration::from_secs(2 * n as u64));
    }
}

#[tokio::test]
async fn awaiting_a_succeeded_handle_twice_gives_the_same_artifact() {
    let engine = Arc::new(ScriptedEngine::new(&[QueryStatus::Succeeded]));
    let (exec, _) = executor(engine.clone());
    let handle = exec.submit(&request()).await.unwrap();
    let opts = WaitOptions::fixed(Duration::from_millis(100));

    let first = exec.await_completion(&handle, &opts).await.unwrap();
    let second = exec.await_completion(&handle, &opts).await.unwrap();

    assert_eq!(first, second);
    // Each call observes live status; nothing is cached.
    assert_eq!(engine.polls(), 2);
}

#[tokio::test]
async fn failed_query_is_an_execution_error() {
    let engine = Arc::new(ScriptedEngine::failing_with("SYNTAX_ERROR: line 1:8"));
    let (exec, _) = executor(engine.clone());
    let handle = exec.submit(&request()).await.unwrap();

    let err = exec
        .await_completion(&handle, &WaitOptions::fixed(Duration::from_millis(10)))
        .await
        .unwrap_err();

    match err {
        QueryError::Execution { handle: h, status, reason } => {
            assert_eq!(h, handle.id());
            assert_eq!(status, QueryStatus::Failed);
            assert_eq!(reason.as_deref(), Some("SYNTAX_ERROR: line 1:8"));
        }
        other => panic!("expected Execution, got {other:?}"),
    }
    assert_eq!(engine.polls(), 2);
}

#[tokio::test]
async fn cancelled_query_is_an_execution_error() {
    let engine = Arc::new(ScriptedEngine::new(&[QueryStatus::Submitted, QueryStatus::Cancelled]));
    let (exec, _) = executor(engine);
    let handle = exec.submit(&request()).await.unwrap();

    let err = exec
        .await_completion(&handle, &WaitOptions::fixed(Duration::ZERO))
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::Execution { status: QueryStatus::Cancelled, .. }));
}

#[tokio::test]
async fn zero_interval_with_short_timeout_times_out_before_success() {
    let clock = Arc::new(ManualClock::new());
    let engine = Arc::new(TimedEngine::new(
        clock.clone(),
        Duration::from_secs(5),
        Duration::from_millis(100),
    ));
    let exec = QueryExecutor::with_clock(engine.clone(), clock.clone());
    let handle = exec.submit(&request()).await.unwrap();

    let opts = WaitOptions::fixed(Duration::ZERO).with_timeout(Some(Duration::from_secs(1)));
    let err = exec.await_completion(&handle, &opts).await.unwrap_err();

    match err {
        QueryError::Timeout { last_status, elapsed, .. } => {
            assert_eq!(last_status, QueryStatus::Running);
            assert!(elapsed >= Duration::from_secs(1));
        }
        other => panic!("expected Timeout, got {other:?}"),
    }
    assert!(clock.elapsed() < Duration::from_secs(5));
    let observed = engine.observed.lock().unwrap();
    assert!(observed.iter().all(|s| *s == QueryStatus::Running));
}

#[tokio::test]
async fn timeout_does_not_cancel_the_remote_query() {
    let engine = Arc::new(ScriptedEngine::new(&[QueryStatus::Running]));
    let (exec, _) = executor(engine.clone());
    let handle = exec.submit(&request()).await.unwrap();

    let opts = WaitOptions::fixed(Duration::from_secs(1)).with_timeout(Some(Duration::from_secs(3)));
    let err = exec.await_completion(&handle, &opts).await.unwrap_err();

    assert!(matches!(err, QueryError::Timeout { .. }));
    assert_eq!(engine.stops.load(Ordering::SeqCst), 0);
    // Caller may keep polling the same handle afterwards.
    assert_eq!(exec.poll(&handle).await.unwrap(), QueryStatus::Running);
}

#[tokio::test]
async fn sleep_never_overshoots_the_timeout() {
    let engine = Arc::new(ScriptedEngine::new(&[QueryStatus::Running]));
    let (exec, clock) = executor(engine.clone());
    let handle = exec.submit(&request()).await.unwrap();

    let opts = WaitOptions::fixed(Duration::from_secs(10)).with_timeout(Some(Duration::from_secs(3)));
    exec.await_completion(&handle, &opts).await.unwrap_err();

    assert_eq!(clock.elapsed(), Duration::from_secs(3));
    assert_eq!(engine.polls(), 2);
}

#[tokio::test]
async fn fast_engine_succeeds_on_first_poll_without_sleeping() {
    let engine = Arc::new(ScriptedEngine::new(&[QueryStatus::Succeeded]));
    let (exec, clock) = executor(engine.clone());
    let handle = exec.submit(&request()).await.unwrap();

    exec.await_completion(&handle, &WaitOptions::fixed(Duration::from_secs(2)))
        .await
        .unwrap();

    assert_eq!(engine.polls(), 1);
    assert_eq!(clock.elapsed(), Duration::ZERO);
}

#[tokio::test]
async fn unknown_handle_is_surfaced_not_retried() {
    let engine = Arc::new(ScriptedEngine::purged());
    let (exec, _) = executor(engine.clone());
    let handle = QueryHandle::new("purged-42", OUTPUT);

    let err = exec
        .await_completion(&handle, &WaitOptions::fixed(Duration::from_millis(10)))
        .await
        .unwrap_err();

    assert!(matches!(err, QueryError::UnknownHandle { ref handle } if handle == "purged-42"));
    assert_eq!(engine.polls(), 1);
}

#[tokio::test]
async fn failed_submission_is_never_resubmitted() {
    let engine = Arc::new(ScriptedEngine::rejecting_submissions());
    let (exec, _) = executor(engine.clone());

    let err = exec.execute(&request(), &WaitOptions::default()).await.unwrap_err();

    assert!(matches!(err, QueryError::Engine { operation: "start_query", .. }));
    assert_eq!(engine.starts.load(Ordering::SeqCst), 1);
    assert_eq!(engine.polls(), 0);
}

#[tokio::test]
async fn execute_submits_once_and_returns_artifact() {
    let engine = Arc::new(ScriptedEngine::running_then_succeeded(2));
    let (exec, _) = executor(engine.clone());

    let (handle, artifact) = exec
        .execute(&request(), &WaitOptions::fixed(Duration::from_millis(500)))
        .await
        .unwrap();

    assert_eq!(engine.starts.load(Ordering::SeqCst), 1);
    assert_eq!(artifact.uri(), format!("s3://lake/athena-results/{}.csv", handle.id()));
}

#[tokio::test]
async fn concurrent_polls_of_one_handle_are_safe() {
    let engine = Arc::new(ScriptedEngine::new(&[QueryStatus::Running]));
    let (exec, _) = executor(engine.clone());
    let exec = Arc::new(exec);
    let handle = exec.submit(&request()).await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let exec = exec.clone();
        let handle = handle.clone();
        tasks.push(tokio::spawn(async move { exec.poll(&handle).await }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap(), QueryStatus::Running);
    }
    assert_eq!(engine.polls(), 8);
}

#[tokio::test]
async fn explicit_cancel_reaches_the_engine() {
    let engine = Arc::new(ScriptedEngine::new(&[QueryStatus::Running]));
    let (exec, _) = executor(engine.clone());
    let handle = exec.submit(&request()).await.unwrap();

    exec.cancel(&handle).await.unwrap();
    assert_eq!(engine.stops.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn dropping_the_wait_leaves_the_remote_query_alone() {
    let engine = Arc::new(ScriptedEngine::new(&[QueryStatus::Running]));
    let exec = QueryExecutor::new(engine.clone());
    let handle = exec.submit(&request()).await.unwrap();

    let waited = tokio::time::timeout(
        Duration::from_millis(50),
        exec.await_completion(&handle, &WaitOptions::fixed(Duration::from_millis(5))),
    )
    .await;

    assert!(waited.is_err());
    assert!(engine.polls() >= 1);
    assert_eq!(engine.stops.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn backoff_grows_sleep_between_polls() {
    let engine = Arc::new(ScriptedEngine::running_then_succeeded(3));
    let (exec, clock) = executor(engine);
    let handle = exec.submit(&request()).await.unwrap();

    let opts = WaitOptions::fixed(Duration::from_secs(1)).with_backoff(2.0, Duration::from_secs(3));
    exec.await_completion(&handle, &opts).await.unwrap();

    // 1s + 2s + 3s (capped)
    assert_eq!(clock.elapsed(), Duration::from_secs(6));
}
