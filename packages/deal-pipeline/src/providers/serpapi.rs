//! SerpAPI Google Shopping provider.

use async_trait::async_trait;
use serpapi_client::{SearchParams, SerpApiClient, SerpApiConfig, SortBy};

use crate::error::{ProviderError, ProviderResult};
use crate::security::SecretString;
use crate::traits::provider::SearchProvider;
use crate::types::{
    query::{QuerySpec, SortHint},
    raw::RawResult,
};

/// Search provider backed by the SerpAPI `google_shopping` engine.
pub struct SerpApiProvider {
    client: SerpApiClient,
}

impl SerpApiProvider {
    pub fn new(api_key: &SecretString, config: SerpApiConfig) -> ProviderResult<Self> {
        let client = SerpApiClient::new(api_key.expose().to_string(), config)?;
        Ok(Self { client })
    }

    /// Request parameters for a query spec.
    ///
    /// Pages are walked with `start` offsets of one page size each.
    pub fn params_for(&self, query: &QuerySpec) -> SearchParams {
        let num = self.client.config().num_results;
        let mut params = SearchParams::new(query.search_terms())
            .with_num(num)
            .with_start(query.page * num);

        if query.on_sale {
            params = params.on_sale();
        }
        if let Some(sort_by) = sort_param(query.sort) {
            params = params.with_sort(sort_by);
        }
        if let Some(max_price) = query.max_price() {
            params = params.with_price_range(None, Some(max_price));
        }

        params
    }
}

fn sort_param(hint: SortHint) -> Option<SortBy> {
    match hint {
        SortHint::Relevance => None,
        SortHint::PriceLowToHigh => Some(SortBy::PriceLowToHigh),
        SortHint::PriceHighToLow => Some(SortBy::PriceHighToLow),
    }
}

#[async_trait]
impl SearchProvider for SerpApiProvider {
    async fn search(&self, query: &QuerySpec) -> ProviderResult<Vec<RawResult>> {
        let params = self.params_for(query);
        let results = self
            .client
            .shopping_results(&params)
            .await
            .map_err(ProviderError::from)?;

        tracing::debug!(
            query = %params.query,
            start = ?params.start,
            results = results.len(),
            "SerpAPI search complete"
        );

        Ok(results.into_iter().map(RawResult::from).collect())
    }
}
