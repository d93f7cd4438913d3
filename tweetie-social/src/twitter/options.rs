use crate::twitter::rate::RetryPolicy;
use tokio_util::sync::CancellationToken;

/// Knobs shared by [`fetch_recent`](crate::twitter::fetch_recent) and
/// [`fetch_following`](crate::twitter::fetch_following).
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Items requested per timeline page (the endpoint caps this at 200).
    pub page_size: u32,
    /// Profile lookups allowed in flight at once while resolving follows.
    pub max_in_flight: usize,
    pub retry: RetryPolicy,
    /// Checked between pages and between identifier lookups, never mid-call.
    pub cancel: CancellationToken,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_size: 200,
            max_in_flight: 8,
            retry: RetryPolicy::default(),
            cancel: CancellationToken::new(),
        }
    }
}

impl FetchOptions {
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
