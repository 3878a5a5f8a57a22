//! Deal-alert source trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::types::query::SeedQuery;

/// A user's standing request to be told about deals on something.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealAlert {
    pub name: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub max_price: Option<f64>,
}

impl DealAlert {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            category: None,
            tag: None,
            max_price: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_max_price(mut self, max_price: f64) -> Self {
        self.max_price = Some(max_price);
        self
    }

    /// Search keyword: name, category and tag joined by spaces.
    pub fn keyword(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.name, &self.category, &self.tag]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    /// Planner seed for this alert; `None` when there is nothing to search.
    pub fn seed(&self) -> Option<SeedQuery> {
        let keyword = self.keyword()?;
        Some(
            SeedQuery::new(keyword)
                .with_category(self.category.as_deref())
                .with_max_price(self.max_price.filter(|p| p.is_finite() && *p > 0.0)),
        )
    }
}

/// Active deal alerts. Alert seeds are planned ahead of popular keywords.
#[async_trait]
pub trait AlertSource: Send + Sync {
    async fn active_alerts(&self) -> StoreResult<Vec<DealAlert>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_keyword_joins_parts() {
        let alert = DealAlert::new("Airfryer")
            .with_category("Ev Aletleri")
            .with_tag("Philips");
        assert_eq!(alert.keyword().as_deref(), Some("Airfryer Ev Aletleri Philips"));

        let tag_only = DealAlert {
            name: Some("  ".to_string()),
            category: None,
            tag: Some("Dyson".to_string()),
            max_price: None,
        };
        assert_eq!(tag_only.keyword().as_deref(), Some("Dyson"));
    }

    #[test]
    fn test_alert_seed() {
        let seed = DealAlert::new("Robot süpürge")
            .with_category("Ev Aletleri")
            .with_max_price(12000.0)
            .seed()
            .unwrap();
        assert_eq!(seed.keyword, "Robot süpürge Ev Aletleri");
        assert_eq!(seed.category.as_deref(), Some("Ev Aletleri"));
        assert_eq!(seed.max_price, Some(12000.0));

        let empty = DealAlert {
            name: None,
            category: None,
            tag: None,
            max_price: Some(100.0),
        };
        assert!(empty.seed().is_none());
    }
}
