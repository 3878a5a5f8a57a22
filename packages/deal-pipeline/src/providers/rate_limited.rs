//! Rate-limited search provider wrapper.
//!
//! Wraps any SearchProvider with a request quota using the governor crate.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::error::ProviderResult;
use crate::traits::provider::SearchProvider;
use crate::types::{query::QuerySpec, raw::RawResult};

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// A provider wrapper that spaces out queries.
pub struct RateLimitedProvider<P: SearchProvider> {
    inner: P,
    limiter: Arc<DefaultRateLimiter>,
}

impl<P: SearchProvider> RateLimitedProvider<P> {
    /// Allow at most `queries_per_second` searches per second, no burst.
    pub fn new(provider: P, queries_per_second: NonZeroU32) -> Self {
        Self::with_quota(provider, Quota::per_second(queries_per_second))
    }

    /// Create with a custom quota.
    pub fn with_quota(provider: P, quota: Quota) -> Self {
        Self {
            inner: provider,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: SearchProvider> SearchProvider for RateLimitedProvider<P> {
    async fn search(&self, query: &QuerySpec) -> ProviderResult<Vec<RawResult>> {
        self.limiter.until_ready().await;
        self.inner.search(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockProvider;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn test_passes_through() {
        let mock = MockProvider::new().with_results("tv", vec![RawResult::new().with_title("TV")]);
        let provider = RateLimitedProvider::new(mock, NonZeroU32::MIN);

        let results = provider.search(&QuerySpec::new("tv")).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(provider.inner().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_spaces_out_queries() {
        let quota = Quota::with_period(Duration::from_millis(50)).unwrap();
        let provider = RateLimitedProvider::with_quota(MockProvider::new(), quota);

        let start = Instant::now();
        for _ in 0..3 {
            provider.search(&QuerySpec::new("tv")).await.unwrap();
        }

        assert!(start.elapsed() >= Duration::from_millis(90));
        assert_eq!(provider.inner().calls().len(), 3);
    }
}
