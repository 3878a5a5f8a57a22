use std::time::Duration;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Static client settings. Defaults target Google Shopping Turkey.
#[derive(Debug, Clone)]
pub struct SerpApiConfig {
    pub base_url: String,
    pub engine: String,
    /// `gl` parameter.
    pub country: String,
    /// `hl` parameter.
    pub language: String,
    pub google_domain: String,
    pub num_results: u32,
    pub timeout: Duration,
}

impl Default for SerpApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://serpapi.com/search".to_string(),
            engine: "google_shopping".to_string(),
            country: "tr".to_string(),
            language: "tr".to_string(),
            google_domain: "google.com.tr".to_string(),
            num_results: 40,
            timeout: Duration::from_secs(30),
        }
    }
}

impl SerpApiConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_locale(
        mut self,
        country: impl Into<String>,
        language: impl Into<String>,
        google_domain: impl Into<String>,
    ) -> Self {
        self.country = country.into();
        self.language = language.into();
        self.google_domain = google_domain.into();
        self
    }

    pub fn with_num_results(mut self, num: u32) -> Self {
        self.num_results = num;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Google Shopping `sort_by` values. Relevance is expressed by omitting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    PriceLowToHigh,
    PriceHighToLow,
}

impl SortBy {
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::PriceLowToHigh => "1",
            Self::PriceHighToLow => "2",
        }
    }
}

/// Per-request search parameters.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub query: String,
    /// Overrides `SerpApiConfig::num_results`.
    pub num: Option<u32>,
    /// Result offset.
    pub start: Option<u32>,
    pub on_sale: bool,
    pub sort_by: Option<SortBy>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// `new`, `used` or `refurbished`.
    pub condition: Option<String>,
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn on_sale(mut self) -> Self {
        self.on_sale = true;
        self
    }

    pub fn with_sort(mut self, sort_by: SortBy) -> Self {
        self.sort_by = Some(sort_by);
        self
    }

    pub fn with_start(mut self, start: u32) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_num(mut self, num: u32) -> Self {
        self.num = Some(num);
        self
    }

    pub fn with_price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }
}

/// Top-level Google Shopping response. Only the parts the client reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShoppingResponse {
    #[serde(default)]
    pub shopping_results: Vec<ShoppingResult>,
    #[serde(default)]
    pub inline_shopping_results: Vec<ShoppingResult>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub error: Option<String>,
}

impl ShoppingResponse {
    /// Main results followed by inline results.
    pub fn into_results(self) -> Vec<ShoppingResult> {
        let mut results = self.shopping_results;
        results.extend(self.inline_shopping_results);
        results
    }
}

/// A single shopping hit.
///
/// Fields vary between result blocks and locales: prices come as numbers or
/// formatted strings, ids as strings or numbers. Numeric-ish fields are kept
/// as raw JSON and text fields accept numbers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShoppingResult {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub product_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub product_link: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub source: Option<String>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub extracted_price: Option<Value>,
    #[serde(default)]
    pub old_price: Option<Value>,
    #[serde(default)]
    pub extracted_old_price: Option<Value>,
    #[serde(default)]
    pub rating: Option<Value>,
    #[serde(default)]
    pub reviews: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub serpapi_thumbnail: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tag: Option<String>,
    #[serde(default)]
    pub extensions: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub delivery: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub second_hand_condition: Option<String>,
}

impl ShoppingResult {
    pub fn url(&self) -> Option<&str> {
        self.product_link.as_deref().or(self.link.as_deref())
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail
            .as_deref()
            .or(self.serpapi_thumbnail.as_deref())
    }

    /// Current price, preferring the pre-parsed number.
    pub fn best_price(&self) -> Option<&Value> {
        non_null(&self.extracted_price).or(non_null(&self.price))
    }

    pub fn best_old_price(&self) -> Option<&Value> {
        non_null(&self.extracted_old_price).or(non_null(&self.old_price))
    }

    /// `tag`, or the first extension that looks like a discount ("%"/"OFF").
    pub fn discount_tag(&self) -> Option<String> {
        if let Some(tag) = &self.tag {
            return Some(tag.clone());
        }
        self.extensions.iter().find_map(|ext| {
            let text = match ext {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let upper = text.to_uppercase();
            (upper.contains("OFF") || upper.contains('%')).then_some(text)
        })
    }
}

fn non_null(value: &Option<Value>) -> Option<&Value> {
    value.as_ref().filter(|v| !v.is_null())
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "search_metadata": {"status": "Success"},
        "shopping_results": [
            {
                "position": 1,
                "title": "Kablosuz Kulaklık",
                "product_id": 1234567890,
                "product_link": "https://www.google.com.tr/shopping/product/1234567890",
                "source": "Hepsiburada",
                "price": "1.299,99 TL",
                "extracted_price": 1299.99,
                "old_price": "1.999,99 TL",
                "extracted_old_price": 1999.99,
                "rating": 4.6,
                "reviews": 812,
                "thumbnail": "https://img.example/1.jpg",
                "tag": "35% İNDİRİM",
                "delivery": "Ücretsiz kargo"
            },
            {
                "title": "Mouse",
                "link": "https://shop.example/mouse",
                "price": "₺349",
                "extensions": ["Free delivery", "20% OFF"],
                "serpapi_thumbnail": "https://img.example/2.jpg",
                "rating": "4.1"
            }
        ],
        "inline_shopping_results": [
            {"title": 42, "price": null, "source": "Trendyol"}
        ]
    }"#;

    #[test]
    fn test_deserialize_mixed_types() {
        let response: ShoppingResponse = serde_json::from_str(SAMPLE).unwrap();
        assert!(response.error.is_none());
        let results = response.into_results();
        assert_eq!(results.len(), 3);

        let first = &results[0];
        assert_eq!(first.product_id.as_deref(), Some("1234567890"));
        assert_eq!(first.best_price().and_then(Value::as_f64), Some(1299.99));
        assert_eq!(first.best_old_price().and_then(Value::as_f64), Some(1999.99));
        assert_eq!(first.discount_tag().as_deref(), Some("35% İNDİRİM"));

        let second = &results[1];
        assert_eq!(second.url(), Some("https://shop.example/mouse"));
        assert_eq!(second.thumbnail_url(), Some("https://img.example/2.jpg"));
        assert_eq!(second.best_price(), Some(&Value::String("₺349".into())));
        assert_eq!(second.discount_tag().as_deref(), Some("20% OFF"));

        let inline = &results[2];
        assert_eq!(inline.title.as_deref(), Some("42"));
        assert!(inline.best_price().is_none());
    }

    #[test]
    fn test_error_only_response() {
        let response: ShoppingResponse = serde_json::from_str(
            r#"{"error": "Google hasn't returned any results for this query."}"#,
        )
        .unwrap();
        assert!(response.shopping_results.is_empty());
        assert!(response.error.is_some());
    }

    #[test]
    fn test_sort_params() {
        assert_eq!(SortBy::PriceLowToHigh.as_param(), "1");
        assert_eq!(SortBy::PriceHighToLow.as_param(), "2");
    }
}
