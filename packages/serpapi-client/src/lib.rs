//! Pure SerpAPI Google Shopping REST client.
//!
//! A minimal client for the `google_shopping` engine. It builds request
//! parameters, sends a single search and returns the loosely typed result
//! records. Interpretation of those records is left to the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use serpapi_client::{SearchParams, SerpApiClient, SerpApiConfig, SortBy};
//!
//! let client = SerpApiClient::new("your-api-key".into(), SerpApiConfig::default())?;
//!
//! let params = SearchParams::new("kulaklık").on_sale().with_sort(SortBy::PriceLowToHigh);
//! for item in client.shopping_results(&params).await? {
//!     println!("{}", item.title.as_deref().unwrap_or("(no title)"));
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{classify_error, Result, SerpApiError};
pub use types::{SearchParams, SerpApiConfig, ShoppingResponse, ShoppingResult, SortBy};

/// Message SerpAPI returns with HTTP 200 when a query simply has no hits.
const NO_RESULTS_MARKER: &str = "hasn't returned any results";

pub struct SerpApiClient {
    client: reqwest::Client,
    api_key: String,
    config: SerpApiConfig,
}

impl SerpApiClient {
    pub fn new(api_key: String, config: SerpApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    pub fn config(&self) -> &SerpApiConfig {
        &self.config
    }

    /// Query-string pairs for a search, without the API key.
    pub fn query_pairs(&self, params: &SearchParams) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("engine", self.config.engine.clone()),
            ("q", params.query.clone()),
            ("gl", self.config.country.clone()),
            ("hl", self.config.language.clone()),
            ("google_domain", self.config.google_domain.clone()),
            (
                "num",
                params.num.unwrap_or(self.config.num_results).to_string(),
            ),
        ];

        if let Some(start) = params.start.filter(|s| *s > 0) {
            pairs.push(("start", start.to_string()));
        }
        if params.on_sale {
            pairs.push(("on_sale", "true".to_string()));
        }
        if let Some(sort_by) = params.sort_by {
            pairs.push(("sort_by", sort_by.as_param().to_string()));
        }
        if let Some(min) = params.min_price {
            pairs.push(("min_price", min.to_string()));
        }
        if let Some(max) = params.max_price {
            pairs.push(("max_price", max.to_string()));
        }
        if let Some(condition) = &params.condition {
            pairs.push(("condition", condition.clone()));
        }

        pairs
    }

    /// Run one search and return the raw response.
    pub async fn search_shopping(&self, params: &SearchParams) -> Result<ShoppingResponse> {
        let mut pairs = self.query_pairs(params);
        pairs.push(("api_key", self.api_key.clone()));

        tracing::debug!(query = %params.query, start = ?params.start, "SerpAPI shopping search");

        let resp = self
            .client
            .get(&self.config.base_url)
            .query(&pairs)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_error(status.as_u16(), error_message(&body)));
        }

        let response: ShoppingResponse = resp.json().await?;

        if let Some(message) = &response.error {
            if message.contains(NO_RESULTS_MARKER) {
                tracing::debug!(query = %params.query, "No shopping results");
                return Ok(ShoppingResponse::default());
            }
            return Err(classify_error(status.as_u16(), message.clone()));
        }

        Ok(response)
    }

    /// Run one search and return main plus inline results.
    pub async fn shopping_results(&self, params: &SearchParams) -> Result<Vec<ShoppingResult>> {
        let results = self.search_shopping(params).await?.into_results();
        tracing::info!(query = %params.query, count = results.len(), "Fetched shopping results");
        Ok(results)
    }
}

/// Pull the `error` field out of a JSON error body, or fall back to the text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
