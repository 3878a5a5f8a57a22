//! Canonical deal record.

use serde::{Deserialize, Serialize};

/// Title used when the provider omits one.
pub const PLACEHOLDER_TITLE: &str = "Untitled product";

/// A normalized product offer.
///
/// Created once per raw result by the normalizer and never modified
/// afterwards. `discount_percent` is always derived from the two prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub title: String,
    pub current_price: f64,
    pub original_price: Option<f64>,
    /// 0-100.
    pub discount_percent: u8,
    /// 0.0-5.0.
    pub rating: Option<f64>,
    pub source: String,
    pub link: Option<String>,
    pub category: Option<String>,
    /// Keyword of the query that produced this record.
    pub query_keyword: String,
    pub currency: String,
    pub thumbnail: Option<String>,
    pub reviews: Option<u32>,
    pub product_id: Option<String>,
    pub discount_tag: Option<String>,
    pub delivery: Option<String>,
    pub condition: Option<String>,
}

/// Dedup key: the same real-world offer found through different queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DealIdentity {
    pub title: String,
    pub link: String,
}

impl Deal {
    pub fn identity(&self) -> DealIdentity {
        DealIdentity {
            title: normalize_title(&self.title),
            link: self.link.clone().unwrap_or_default(),
        }
    }

    pub fn has_discount(&self) -> bool {
        self.discount_percent > 0
    }

    /// Original price for display, falling back to the current price.
    pub fn list_price(&self) -> f64 {
        self.original_price.unwrap_or(self.current_price)
    }

    /// One-line description used when staging the deal for review.
    pub fn description(&self) -> String {
        let mut parts = vec![format!("Found on {}", self.source)];
        if let Some(rating) = self.rating {
            parts.push(format!("Rating: {}/5", rating));
        }
        if let Some(reviews) = self.reviews.filter(|r| *r > 0) {
            parts.push(format!("({} reviews)", reviews));
        }
        if let Some(delivery) = &self.delivery {
            parts.push(format!("Delivery: {}", delivery));
        }
        if let Some(condition) = &self.condition {
            parts.push(format!("Condition: {}", condition));
        }
        parts.join(" | ")
    }
}

/// Trim, lowercase and collapse internal whitespace.
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
