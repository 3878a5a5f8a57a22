//! Search provider trait.
//!
//! The pipeline sends one query specification at a time and waits for the
//! answer before sending the next, so implementations never see concurrent
//! calls from a single run.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ProviderResult;
use crate::types::{query::QuerySpec, raw::RawResult};

/// A shopping-search backend.
///
/// # Implementations
///
/// - `SerpApiProvider` - SerpAPI Google Shopping
/// - `RateLimitedProvider` - wraps another provider with a request quota
/// - `MockProvider` - For testing
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one query.
    ///
    /// Errors for which `ProviderError::is_fatal` is true stop the rest of
    /// the run's queries; any other error only skips this query.
    async fn search(&self, query: &QuerySpec) -> ProviderResult<Vec<RawResult>>;
}

#[async_trait]
impl<T: SearchProvider + ?Sized> SearchProvider for Arc<T> {
    async fn search(&self, query: &QuerySpec) -> ProviderResult<Vec<RawResult>> {
        (**self).search(query).await
    }
}
