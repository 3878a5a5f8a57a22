//! In-memory approval store, fixed keyword list and fixed alert list.
//!
//! Used for dry runs without a database and for tests.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::traits::{
    alerts::{AlertSource, DealAlert},
    approval::{ApprovalStore, StageOutcome},
    keywords::{KeywordFrequency, KeywordSource},
};
use crate::types::deal::{Deal, DealIdentity};

/// Approval store that keeps staged deals in memory.
///
/// A deal whose identity was staged before is reported as `AlreadyStaged`.
#[derive(Debug, Default, Clone)]
pub struct MemoryApprovalStore {
    staged: Arc<RwLock<Vec<(String, Deal)>>>,
    identities: Arc<RwLock<HashSet<DealIdentity>>>,
}

impl MemoryApprovalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Staged deals with their ids, in staging order.
    pub fn staged(&self) -> Vec<(String, Deal)> {
        self.staged
            .read()
            .map(|staged| staged.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.staged.read().map(|staged| staged.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn stage_one(&self, deal: &Deal) -> StoreResult<StageOutcome> {
        let mut identities = self
            .identities
            .write()
            .map_err(|_| StoreError::UnexpectedResponse("memory store lock poisoned".into()))?;
        if !identities.insert(deal.identity()) {
            return Ok(StageOutcome::AlreadyStaged);
        }

        let id = Uuid::new_v4().to_string();
        self.staged
            .write()
            .map_err(|_| StoreError::UnexpectedResponse("memory store lock poisoned".into()))?
            .push((id.clone(), deal.clone()));

        Ok(StageOutcome::Staged { id })
    }
}

#[async_trait]
impl ApprovalStore for MemoryApprovalStore {
    async fn stage(&self, deals: &[Deal]) -> Vec<StoreResult<StageOutcome>> {
        deals.iter().map(|deal| self.stage_one(deal)).collect()
    }
}

/// Keyword source backed by a fixed list, most popular first.
#[derive(Debug, Clone, Default)]
pub struct StaticKeywords {
    keywords: Vec<String>,
}

impl StaticKeywords {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl KeywordSource for StaticKeywords {
    async fn popular_keywords(&self, limit: usize) -> StoreResult<Vec<KeywordFrequency>> {
        let count = self.keywords.len();
        Ok(self
            .keywords
            .iter()
            .take(limit)
            .enumerate()
            .map(|(rank, keyword)| KeywordFrequency::new(keyword.clone(), (count - rank) as u32))
            .collect())
    }
}

/// Alert source backed by a fixed list.
#[derive(Debug, Clone, Default)]
pub struct StaticAlerts {
    alerts: Vec<DealAlert>,
}

impl StaticAlerts {
    pub fn new(alerts: impl IntoIterator<Item = DealAlert>) -> Self {
        Self {
            alerts: alerts.into_iter().collect(),
        }
    }
}

#[async_trait]
impl AlertSource for StaticAlerts {
    async fn active_alerts(&self) -> StoreResult<Vec<DealAlert>> {
        Ok(self.alerts.clone())
    }
}
