use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use super::async_task::task_with_backoff;
use crate::Error;
use crate::Result;

fn retry_all(_error: &Error) -> bool {
    true
}

#[tokio::test]
async fn task_with_backoff_should_return_first_success() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let result: Result<u32> = task_with_backoff(
        || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(42)
            }
        },
        3,
        Duration::from_millis(1),
        retry_all,
    )
    .await;

    assert_eq!(result.unwrap(), 42);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn task_with_backoff_should_retry_until_attempts_exhausted() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let result: Result<u32> = task_with_backoff(
        || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(Error::Fatal("boom".to_string()))
            }
        },
        3,
        Duration::from_millis(1),
        retry_all,
    )
    .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn task_with_backoff_should_succeed_after_transient_failures() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let result: Result<&str> = task_with_backoff(
        || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(Error::Fatal("transient".to_string()))
                } else {
                    Ok("done")
                }
            }
        },
        5,
        Duration::from_millis(1),
        retry_all,
    )
    .await;

    assert_eq!(result.unwrap(), "done");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn task_with_backoff_should_stop_on_non_retryable_error() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let result: Result<u32> = task_with_backoff(
        || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(Error::Fatal("permanent".to_string()))
            }
        },
        5,
        Duration::from_millis(1),
        |_error| false,
    )
    .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn task_with_backoff_should_treat_zero_attempts_as_one() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let result: Result<u32> = task_with_backoff(
        || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(Error::Fatal("boom".to_string()))
            }
        },
        0,
        Duration::from_millis(1),
        retry_all,
    )
    .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
