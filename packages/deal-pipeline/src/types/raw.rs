//! Provider-agnostic raw search hit.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One shopping-search hit before normalization.
///
/// Every field may be absent. Numeric fields keep the raw JSON value because
/// providers send either numbers or formatted strings (`"1.299,99 TL"`).
///
/// | field | when absent |
/// |---|---|
/// | `title` | placeholder title, if a link exists |
/// | `price` | record rejected |
/// | `original_price` | discount is 0 |
/// | `rating`, `reviews` | `None` |
/// | `source` | `"Unknown"` |
/// | `link` | identity uses the title alone |
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawResult {
    pub title: Option<String>,
    pub price: Option<Value>,
    pub original_price: Option<Value>,
    pub rating: Option<Value>,
    pub reviews: Option<Value>,
    pub source: Option<String>,
    pub link: Option<String>,
    pub thumbnail: Option<String>,
    pub product_id: Option<String>,
    /// Display-only discount label, e.g. "51% OFF".
    pub discount_tag: Option<String>,
    pub delivery: Option<String>,
    pub condition: Option<String>,
}

impl RawResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_price(mut self, price: impl Into<Value>) -> Self {
        self.price = Some(price.into());
        self
    }

    pub fn with_original_price(mut self, price: impl Into<Value>) -> Self {
        self.original_price = Some(price.into());
        self
    }

    pub fn with_rating(mut self, rating: impl Into<Value>) -> Self {
        self.rating = Some(rating.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

impl From<serpapi_client::ShoppingResult> for RawResult {
    fn from(item: serpapi_client::ShoppingResult) -> Self {
        Self {
            price: item.best_price().cloned(),
            original_price: item.best_old_price().cloned(),
            link: item.url().map(str::to_string),
            thumbnail: item.thumbnail_url().map(str::to_string),
            discount_tag: item.discount_tag(),
            title: item.title,
            rating: item.rating,
            reviews: item.reviews,
            source: item.source,
            product_id: item.product_id,
            delivery: item.delivery,
            condition: item.second_hand_condition,
        }
    }
}
