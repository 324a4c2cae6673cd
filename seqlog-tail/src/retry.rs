//! Fixed-interval retry policy.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Waits a fixed interval between attempts, giving up only on shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    interval: Duration,
}

impl RetryPolicy {
    pub fn fixed(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sleep for one backoff interval.
    ///
    /// Returns `false` if `shutdown` fired first, in which case the caller
    /// should stop instead of retrying.
    pub async fn wait(&self, shutdown: &CancellationToken) -> bool {
        tokio::select! {
            _ = shutdown.cancelled() => false,
            _ = tokio::time::sleep(self.interval) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn wait_sleeps_for_interval() {
        let policy = RetryPolicy::fixed(Duration::from_secs(60));
        let shutdown = CancellationToken::new();
        let start = Instant::now();

        assert!(policy.wait(&shutdown).await);
        assert!(start.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_stops_on_shutdown() {
        let policy = RetryPolicy::fixed(Duration::from_secs(60));
        let shutdown = CancellationToken::new();

        let canceller = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            canceller.cancel();
        });

        let start = Instant::now();
        assert!(!policy.wait(&shutdown).await);
        assert!(start.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test]
    async fn wait_returns_immediately_when_already_cancelled() {
        let policy = RetryPolicy::fixed(Duration::from_secs(3600));
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        assert!(!policy.wait(&shutdown).await);
    }
}
