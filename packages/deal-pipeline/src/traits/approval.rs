//! Approval store trait.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::types::deal::Deal;

/// Result of staging one deal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StageOutcome {
    /// Written for review under this id.
    Staged { id: String },
    /// The store already holds this offer.
    AlreadyStaged,
}

/// External store where deals wait for human approval.
///
/// Failures are per deal: one bad write never stops the rest of the batch,
/// and nothing is retried.
#[async_trait]
pub trait ApprovalStore: Send + Sync {
    /// Stage deals in order. Returns exactly one entry per input deal.
    async fn stage(&self, deals: &[Deal]) -> Vec<StoreResult<StageOutcome>>;
}

#[async_trait]
impl<T: ApprovalStore + ?Sized> ApprovalStore for Arc<T> {
    async fn stage(&self, deals: &[Deal]) -> Vec<StoreResult<StageOutcome>> {
        (**self).stage(deals).await
    }
}
