//! Configuration types for planning, ranking and pipeline runs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DealError, Result};

/// Highest accepted discount threshold.
pub const MAX_DISCOUNT: u32 = 100;

/// Ranking key for the final deal list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Highest discount first.
    #[default]
    Discount,
    /// Cheapest first.
    Price,
    /// Best rated first; unrated deals last.
    Rating,
    /// Keep provider/planner order.
    Relevance,
}

impl FromStr for SortKey {
    type Err = DealError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "discount" => Ok(Self::Discount),
            "price" => Ok(Self::Price),
            "rating" => Ok(Self::Rating),
            "relevance" => Ok(Self::Relevance),
            other => Err(DealError::invalid(format!(
                "unknown sort_by value '{}' (expected discount, price, rating or relevance)",
                other
            ))),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Discount => "discount",
            Self::Price => "price",
            Self::Rating => "rating",
            Self::Relevance => "relevance",
        };
        f.write_str(name)
    }
}

/// Configuration for the filter/rank engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankConfig {
    /// Minimum `discount_percent` to keep (0-100).
    pub min_discount: u32,

    /// Keep only deals in this category (case-insensitive exact match).
    pub category: Option<String>,

    pub sort_by: SortKey,

    /// Truncate the output to this many deals.
    pub limit: Option<usize>,
}

impl RankConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_discount(mut self, min_discount: u32) -> Self {
        self.min_discount = min_discount;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_sort(mut self, sort_by: SortKey) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_min_discount(self.min_discount)?;
        if self.limit == Some(0) {
            return Err(DealError::invalid("limit must be a positive integer"));
        }
        Ok(())
    }
}

/// Configuration for the query planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Result pages to walk per sort variation.
    pub max_pages: u32,

    /// Request on-sale items only.
    pub on_sale: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_pages: 3,
            on_sale: true,
        }
    }
}

impl PlannerConfig {
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }
}

/// Static pipeline settings, fixed when the pipeline is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub planner: PlannerConfig,

    /// Currency the provider reports prices in.
    pub currency: String,

    /// Popular keywords to seed from when no keyword is given.
    pub seed_keywords: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            planner: PlannerConfig::default(),
            currency: "USD".to_string(),
            seed_keywords: 10,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_planner(mut self, planner: PlannerConfig) -> Self {
        self.planner = planner;
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_seed_keywords(mut self, count: usize) -> Self {
        self.seed_keywords = count;
        self
    }
}

/// Parameters of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Seeds from the popular-keywords source when `None`.
    pub keyword: Option<String>,
    pub category: Option<String>,
    pub min_discount: u32,
    pub max_queries: usize,
    pub sort_by: SortKey,
    pub limit: Option<usize>,
    /// Skip the approval store but still return the ranked deals.
    pub dry_run: bool,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            keyword: None,
            category: None,
            min_discount: 10,
            max_queries: 20,
            sort_by: SortKey::Discount,
            limit: None,
            dry_run: false,
        }
    }
}

impl SearchRequest {
    pub fn for_keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_min_discount(mut self, min_discount: u32) -> Self {
        self.min_discount = min_discount;
        self
    }

    pub fn with_max_queries(mut self, max_queries: usize) -> Self {
        self.max_queries = max_queries;
        self
    }

    pub fn with_sort(mut self, sort_by: SortKey) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// The category to plan and filter by: trimmed, `None` when blank.
    pub fn category_filter(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    pub fn rank_config(&self) -> RankConfig {
        RankConfig {
            min_discount: self.min_discount,
            category: self.category_filter().map(str::to_string),
            sort_by: self.sort_by,
            limit: self.limit,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_max_queries(self.max_queries)?;
        self.rank_config().validate()
    }
}

pub fn validate_min_discount(min_discount: u32) -> Result<()> {
    if min_discount > MAX_DISCOUNT {
        return Err(DealError::invalid(format!(
            "min_discount must be between 0 and 100, got {}",
            min_discount
        )));
    }
    Ok(())
}

pub fn validate_max_queries(max_queries: usize) -> Result<()> {
    if max_queries == 0 {
        return Err(DealError::invalid("max_queries must be a positive integer"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("discount".parse::<SortKey>().unwrap(), SortKey::Discount);
        assert_eq!(" Price ".parse::<SortKey>().unwrap(), SortKey::Price);
        assert_eq!("RATING".parse::<SortKey>().unwrap(), SortKey::Rating);
        assert_eq!("relevance".parse::<SortKey>().unwrap(), SortKey::Relevance);

        let err = "popularity".parse::<SortKey>().unwrap_err();
        assert!(matches!(err, DealError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_sort_key_display_roundtrips() {
        for key in [
            SortKey::Discount,
            SortKey::Price,
            SortKey::Rating,
            SortKey::Relevance,
        ] {
            assert_eq!(key.to_string().parse::<SortKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_rank_config_validation() {
        assert!(RankConfig::new().with_min_discount(100).validate().is_ok());
        assert!(RankConfig::new().with_min_discount(150).validate().is_err());
        assert!(RankConfig::new().with_limit(0).validate().is_err());
        assert!(RankConfig::new().with_limit(5).validate().is_ok());
    }

    #[test]
    fn test_category_filter_is_trimmed() {
        let request = SearchRequest::for_keyword("laptop").with_category(" Bilgisayar ");
        assert_eq!(request.category_filter(), Some("Bilgisayar"));
        assert_eq!(request.rank_config().category.as_deref(), Some("Bilgisayar"));

        let blank = SearchRequest::for_keyword("laptop").with_category("  ");
        assert_eq!(blank.category_filter(), None);
        assert_eq!(blank.rank_config().category, None);
    }

    #[test]
    fn test_search_request_validation() {
        assert!(SearchRequest::for_keyword("tv").validate().is_ok());
        assert!(SearchRequest::for_keyword("tv")
            .with_max_queries(0)
            .validate()
            .is_err());
        assert!(SearchRequest::for_keyword("tv")
            .with_min_discount(150)
            .validate()
            .is_err());
    }
}
