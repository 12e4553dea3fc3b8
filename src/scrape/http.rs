//! HTTP page source with timeouts and bounded retries.

use std::io::Read;
use std::time::Duration;

use url::Url;

use super::product::PageSource;
use crate::error::FetchError;

/// Listing pages are small; anything beyond this is not a catalog page.
const MAX_PAGE_BYTES: u64 = 16 * 1024 * 1024;

/// Retry settings for page fetches with exponential backoff.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first try.
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

/// Live catalog over blocking HTTP GET.
pub struct HttpSource {
    agent: ureq::Agent,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .user_agent(concat!("pricewatch/", env!("CARGO_PKG_VERSION")))
            .build();
        HttpSource { agent }
    }
}

impl PageSource for HttpSource {
    fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let response = self.agent.get(url.as_str()).call().map_err(|e| match e {
            ureq::Error::Status(code, _) => FetchError::Status { code, url: url.to_string() },
            ureq::Error::Transport(t) => FetchError::Transport {
                url: url.to_string(),
                message: t.to_string(),
            },
        })?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_PAGE_BYTES)
            .read_to_end(&mut bytes)
            .map_err(|source| FetchError::Body { url: url.to_string(), source })?;

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Run `action` until it succeeds, the error is not retryable, or attempts run out.
///
/// Returns the final result together with the number of attempts made.
pub fn retry_with_backoff<T, E, F, R>(
    config: RetryConfig,
    mut action: F,
    mut should_retry: R,
) -> (Result<T, E>, usize)
where
    F: FnMut() -> Result<T, E>,
    R: FnMut(&E) -> bool,
{
    let mut attempt = 0usize;
    loop {
        attempt += 1;
        match action() {
            Ok(value) => return (Ok(value), attempt),
            Err(err) => {
                if attempt >= config.max_attempts.max(1) || !should_retry(&err) {
                    return (Err(err), attempt);
                }
                let delay = backoff_delay(config.base_delay, config.max_delay, attempt);
                tracing::debug!("attempt {attempt} failed, retrying in {delay:?}");
                std::thread::sleep(delay);
            }
        }
    }
}

fn backoff_delay(base: Duration, max: Duration, attempt: usize) -> Duration {
    let exponent = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
    let factor = 1u32.checked_shl(exponent).unwrap_or(u32::MAX);
    base.checked_mul(factor).unwrap_or(max).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant(max_attempts: usize) -> RetryConfig {
        RetryConfig {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    #[test]
    fn stops_after_success() {
        let mut calls = 0;
        let (result, attempts) = retry_with_backoff(
            instant(4),
            || {
                calls += 1;
                if calls < 2 { Err("boom") } else { Ok(calls) }
            },
            |_| true,
        );
        assert_eq!(result, Ok(2));
        assert_eq!(attempts, 2);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let (result, attempts) =
            retry_with_backoff::<(), _, _, _>(instant(3), || Err("down"), |_| true);
        assert_eq!(result, Err("down"));
        assert_eq!(attempts, 3);
    }

    #[test]
    fn non_retryable_error_fails_immediately() {
        let (result, attempts) =
            retry_with_backoff::<(), _, _, _>(instant(5), || Err(404), |code| *code >= 500);
        assert_eq!(result, Err(404));
        assert_eq!(attempts, 1);
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let (result, attempts) = retry_with_backoff(instant(0), || Ok::<_, ()>(7), |_| true);
        assert_eq!(result, Ok(7));
        assert_eq!(attempts, 1);
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let base = Duration::from_millis(100);
        let max = Duration::from_millis(350);
        assert_eq!(backoff_delay(base, max, 1), Duration::from_millis(100));
        assert_eq!(backoff_delay(base, max, 2), Duration::from_millis(200));
        assert_eq!(backoff_delay(base, max, 3), max);
        assert_eq!(backoff_delay(base, max, 64), max);
    }
}
