//! Popular-keywords source trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;

/// A keyword and how often it showed up in popular deals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordFrequency {
    pub keyword: String,
    pub frequency: u32,
}

impl KeywordFrequency {
    pub fn new(keyword: impl Into<String>, frequency: u32) -> Self {
        Self {
            keyword: keyword.into(),
            frequency,
        }
    }
}

/// Seeds the planner when a run has no explicit keyword.
#[async_trait]
pub trait KeywordSource: Send + Sync {
    /// Most popular keywords first, at most `limit`.
    async fn popular_keywords(&self, limit: usize) -> StoreResult<Vec<KeywordFrequency>>;
}
