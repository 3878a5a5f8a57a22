//! Query specifications produced by the planner.

use serde::{Deserialize, Serialize};

/// Ordering variation requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortHint {
    Relevance,
    PriceLowToHigh,
    PriceHighToLow,
}

impl SortHint {
    /// Planning order.
    pub const ALL: [SortHint; 3] = [
        SortHint::Relevance,
        SortHint::PriceLowToHigh,
        SortHint::PriceHighToLow,
    ];
}

/// A keyword to plan queries for, with its own filters.
///
/// Seeds come from the caller's keyword, active deal alerts or popular
/// keywords. A seed category overrides the request category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedQuery {
    pub keyword: String,
    pub category: Option<String>,
    /// Upper price bound passed to the provider.
    pub max_price: Option<f64>,
}

impl SeedQuery {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            category: None,
            max_price: None,
        }
    }

    pub fn with_category(mut self, category: Option<impl Into<String>>) -> Self {
        self.category = category.map(Into::into);
        self
    }

    pub fn with_max_price(mut self, max_price: Option<f64>) -> Self {
        self.max_price = max_price;
        self
    }
}

/// One parameterized request against the search provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuerySpec {
    pub keyword: String,
    pub category: Option<String>,
    pub sort: SortHint,
    /// Zero-based result page.
    pub page: u32,
    /// Ask the provider for on-sale items only.
    pub on_sale: bool,
    /// Upper price bound in cents. Kept integral so specs stay hashable.
    pub max_price_cents: Option<u64>,
}

impl QuerySpec {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            category: None,
            sort: SortHint::Relevance,
            page: 0,
            on_sale: true,
            max_price_cents: None,
        }
    }

    pub fn with_category(mut self, category: Option<impl Into<String>>) -> Self {
        self.category = category.map(Into::into);
        self
    }

    pub fn with_sort(mut self, sort: SortHint) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Set the upper price bound. Non-positive or non-finite bounds are dropped.
    pub fn with_max_price(mut self, max_price: Option<f64>) -> Self {
        self.max_price_cents = max_price
            .filter(|p| p.is_finite() && *p > 0.0)
            .map(|p| (p * 100.0).round() as u64);
        self
    }

    pub fn max_price(&self) -> Option<f64> {
        self.max_price_cents.map(|cents| cents as f64 / 100.0)
    }

    /// Free-text terms sent to the provider: keyword plus category name.
    pub fn search_terms(&self) -> String {
        match &self.category {
            Some(category) if !self.keyword.to_lowercase().contains(&category.to_lowercase()) => {
                format!("{} {}", self.keyword, category)
            }
            _ => self.keyword.clone(),
        }
    }
}
