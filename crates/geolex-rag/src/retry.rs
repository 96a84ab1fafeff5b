//! Transport-level retry for service HTTP calls.
//!
//! Only [`reqwest::Error`] transport failures (connection refused, timeout)
//! are retried; response status handling stays with each adapter, so 4xx
//! and 5xx answers are never resent from here. Each adapter passes an
//! operation label so retry warnings name the call that degraded.

use std::time::Duration;

/// Total attempts per call: the initial request plus three retries.
const MAX_ATTEMPTS: u32 = 4;

/// Delay before the first retry; doubles each attempt (250ms → 500ms → 1s).
const BASE_DELAY_MS: u64 = 250;

/// Call `f` until it yields a response or `MAX_ATTEMPTS` transport
/// failures have accumulated, backing off between attempts. The final
/// failure is returned as-is.
pub(crate) async fn retry_send<F, Fut>(op: &str, f: F) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut attempt = 1u32;
    loop {
        match f().await {
            Ok(resp) => return Ok(resp),
            Err(e) if attempt >= MAX_ATTEMPTS => return Err(e),
            Err(e) => {
                let delay = Duration::from_millis(BASE_DELAY_MS << (attempt - 1));
                tracing::warn!(
                    op,
                    attempt,
                    max_attempts = MAX_ATTEMPTS,
                    "transport failure, retrying in {delay:?}: {e}"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
