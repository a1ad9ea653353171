//! Retry logic with exponential backoff for content store calls.
//!
//! Retries transport errors (connection failures, per-request timeouts)
//! and 5xx responses. 4xx responses are returned to the caller
//! immediately.

use std::time::Duration;

/// Maximum number of retry attempts after the initial request.
pub(crate) const MAX_RETRIES: u32 = 3;

/// Base delay between retries (doubles each attempt: 200ms, 400ms, 800ms).
const BASE_DELAY_MS: u64 = 200;

/// Send a request, retrying on transport failure or a 5xx status.
///
/// The closure `f` is called up to `MAX_RETRIES + 1` times. The last
/// outcome is returned as-is, so a caller may still see a 5xx response
/// after retries are exhausted.
pub(crate) async fn retry_send<F, Fut>(f: F) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    for attempt in 0..MAX_RETRIES {
        let delay = Duration::from_millis(BASE_DELAY_MS * 2u64.pow(attempt));
        match f().await {
            Ok(resp) if resp.status().is_server_error() => {
                tracing::warn!(
                    attempt = attempt + 1,
                    max_retries = MAX_RETRIES,
                    status = resp.status().as_u16(),
                    "content store returned a server error, retrying in {delay:?}"
                );
            }
            Ok(resp) => return Ok(resp),
            Err(e) => {
                tracing::warn!(
                    attempt = attempt + 1,
                    max_retries = MAX_RETRIES,
                    "content store request failed, retrying in {delay:?}: {e}"
                );
            }
        }
        tokio::time::sleep(delay).await;
    }
    f().await
}
