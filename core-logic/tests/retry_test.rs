use core_logic::{is_proxy_error, with_retry, RetryConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_retry_success_first_try() {
    let counter = Arc::new(AtomicUsize::new(0));
    let config = RetryConfig::new(3, 10);

    let result: Result<String, anyhow::Error> = with_retry(config, "test_op", |_| async {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok("success".to_string())
    })
    .await;

    assert!(result.is_ok());
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_retry_success_after_failures() {
    let counter = Arc::new(AtomicUsize::new(0));
    let config = RetryConfig::new(3, 10);

    let result: Result<String, anyhow::Error> = with_retry(config, "test_op", |_| async {
        let count = counter.fetch_add(1, Ordering::SeqCst) + 1;
        if count < 3 {
            Err(anyhow::anyhow!("temporary error"))
        } else {
            Ok("success".to_string())
        }
    })
    .await;

    assert!(result.is_ok());
    assert_eq!(counter.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retry_exhausts_attempt_budget() {
    let counter = Arc::new(AtomicUsize::new(0));
    let config = RetryConfig::new(3, 10);

    let result: Result<String, anyhow::Error> = with_retry(config, "test_op", |_| async {
        counter.fetch_add(1, Ordering::SeqCst);
        Err(anyhow::anyhow!("permanent error"))
    })
    .await;

    assert!(result.is_err());
    // Exactly 3 attempts total, not 3 retries after the first try.
    assert_eq!(counter.load(Ordering::SeqCst), 3);
    let msg = format!("{:#}", result.unwrap_err());
    assert!(msg.contains("failed after 3 attempts"));
    assert!(msg.contains("permanent error"));
}

#[tokio::test]
async fn test_linear_backoff_delays() {
    let counter = Arc::new(AtomicUsize::new(0));
    let config = RetryConfig::new(3, 50);

    let start = tokio::time::Instant::now();
    let result: Result<String, anyhow::Error> = with_retry(config, "test_op", |_| async {
        let count = counter.fetch_add(1, Ordering::SeqCst) + 1;
        if count < 3 {
            Err(anyhow::anyhow!("temp"))
        } else {
            Ok("done".to_string())
        }
    })
    .await;

    assert!(result.is_ok());
    // Two failures: 50ms then 100ms of linear backoff before the third try.
    assert!(start.elapsed() >= Duration::from_millis(150));
}

#[tokio::test]
async fn test_no_delay_after_final_attempt() {
    let config = RetryConfig::new(1, 5000);

    let start = tokio::time::Instant::now();
    let result: Result<String, anyhow::Error> =
        with_retry(config, "test_op", |_| async { Err(anyhow::anyhow!("nope")) }).await;

    assert!(result.is_err());
    assert!(start.elapsed() < Duration::from_millis(1000));
}

#[tokio::test]
async fn test_closure_sees_attempt_index() {
    let config = RetryConfig::new(3, 1);
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));

    let seen_clone = seen.clone();
    let _: Result<(), anyhow::Error> = with_retry(config, "test_op", move |attempt| {
        let seen = seen_clone.clone();
        async move {
            seen.lock().unwrap().push(attempt);
            Err(anyhow::anyhow!("fail"))
        }
    })
    .await;

    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
}

#[test]
fn test_proxy_error_detection() {
    let tunnel_error = anyhow::anyhow!("error trying to connect: tunnel unsuccessful");
    let refused_error = anyhow::anyhow!("Connection refused (os error 111)");
    let auth_error = anyhow::anyhow!("HTTP status 407");
    let api_error = anyhow::anyhow!("Invalid response shape");

    assert!(is_proxy_error(&tunnel_error));
    assert!(is_proxy_error(&refused_error));
    assert!(is_proxy_error(&auth_error));
    assert!(!is_proxy_error(&api_error));
}

#[test]
fn test_proxy_error_case_insensitive() {
    let upper = anyhow::anyhow!("PROXY CONNECT failed");
    assert!(is_proxy_error(&upper));
}
