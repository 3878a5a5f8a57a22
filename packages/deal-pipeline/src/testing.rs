//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the deal pipeline
//! without making real search or store calls.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::error::{ProviderError, ProviderResult, StoreError, StoreResult};
use crate::traits::{
    approval::{ApprovalStore, StageOutcome},
    provider::SearchProvider,
};
use crate::types::{deal::Deal, query::QuerySpec, raw::RawResult};

pub use crate::stores::memory::{StaticAlerts, StaticKeywords};

/// A mock search provider for testing.
///
/// Returns predefined results by keyword (or by exact query spec) without
/// making network requests. Unknown keywords return an empty result list.
#[derive(Default)]
pub struct MockProvider {
    /// Predefined results by keyword
    results: Arc<RwLock<HashMap<String, Vec<RawResult>>>>,

    /// Predefined results for one exact spec, checked before keyword results
    spec_results: Arc<RwLock<HashMap<QuerySpec, Vec<RawResult>>>>,

    /// Errors to return on the n-th call (zero-based), used once
    call_failures: Arc<RwLock<HashMap<usize, ProviderError>>>,

    /// Keywords whose queries always fail
    fail_keywords: Arc<RwLock<Vec<String>>>,

    /// Call tracking
    calls: Arc<RwLock<Vec<QuerySpec>>>,
}

impl MockProvider {
    /// Create a new mock provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return these results for every query with this keyword.
    pub fn with_results(self, keyword: impl Into<String>, results: Vec<RawResult>) -> Self {
        self.results.write().unwrap().insert(keyword.into(), results);
        self
    }

    /// Return these results for one exact query spec.
    pub fn with_spec_results(self, spec: QuerySpec, results: Vec<RawResult>) -> Self {
        self.spec_results.write().unwrap().insert(spec, results);
        self
    }

    /// Fail the n-th call (zero-based) with this error.
    pub fn fail_call(self, index: usize, error: ProviderError) -> Self {
        self.call_failures.write().unwrap().insert(index, error);
        self
    }

    /// Fail every query for a keyword with a non-fatal error.
    pub fn fail_keyword(self, keyword: impl Into<String>) -> Self {
        self.fail_keywords.write().unwrap().push(keyword.into());
        self
    }

    /// Get all queries sent to this mock, in order.
    pub fn calls(&self) -> Vec<QuerySpec> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for MockProvider {
    async fn search(&self, query: &QuerySpec) -> ProviderResult<Vec<RawResult>> {
        let index = {
            let mut calls = self.calls.write().unwrap();
            calls.push(query.clone());
            calls.len() - 1
        };

        if let Some(error) = self.call_failures.write().unwrap().remove(&index) {
            return Err(error);
        }

        if self.fail_keywords.read().unwrap().contains(&query.keyword) {
            return Err(ProviderError::Api {
                status: Some(503),
                message: format!("Mock failure for '{}'", query.keyword),
            });
        }

        if let Some(results) = self.spec_results.read().unwrap().get(query) {
            return Ok(results.clone());
        }

        Ok(self
            .results
            .read()
            .unwrap()
            .get(&query.keyword)
            .cloned()
            .unwrap_or_default())
    }
}

/// A mock approval store for testing.
///
/// Accepts every deal unless told otherwise and remembers what it staged.
#[derive(Default)]
pub struct MockApprovalStore {
    /// Deals staged so far
    staged: Arc<RwLock<Vec<Deal>>>,

    /// Titles that fail to stage
    fail_titles: Arc<RwLock<HashSet<String>>>,

    /// Titles reported as already staged
    existing_titles: Arc<RwLock<HashSet<String>>>,

    /// Number of `stage` calls
    stage_calls: Arc<RwLock<usize>>,
}

impl MockApprovalStore {
    /// Create a new mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject deals with this title.
    pub fn fail_title(self, title: impl Into<String>) -> Self {
        self.fail_titles.write().unwrap().insert(title.into());
        self
    }

    /// Report deals with this title as already staged.
    pub fn with_existing(self, title: impl Into<String>) -> Self {
        self.existing_titles.write().unwrap().insert(title.into());
        self
    }

    /// Deals staged so far.
    pub fn staged(&self) -> Vec<Deal> {
        self.staged.read().unwrap().clone()
    }

    /// Titles of the deals staged so far, in staging order.
    pub fn staged_titles(&self) -> Vec<String> {
        self.staged
            .read()
            .unwrap()
            .iter()
            .map(|d| d.title.clone())
            .collect()
    }

    /// Number of times `stage` was called.
    pub fn stage_calls(&self) -> usize {
        *self.stage_calls.read().unwrap()
    }
}

#[async_trait]
impl ApprovalStore for MockApprovalStore {
    async fn stage(&self, deals: &[Deal]) -> Vec<StoreResult<StageOutcome>> {
        *self.stage_calls.write().unwrap() += 1;

        let fail_titles = self.fail_titles.read().unwrap().clone();
        let existing = self.existing_titles.read().unwrap().clone();
        let mut staged = self.staged.write().unwrap();

        deals
            .iter()
            .map(|deal| {
                if fail_titles.contains(&deal.title) {
                    return Err(StoreError::Rejected {
                        status: 500,
                        message: format!("Mock rejection for '{}'", deal.title),
                    });
                }
                if existing.contains(&deal.title) {
                    return Ok(StageOutcome::AlreadyStaged);
                }
                staged.push(deal.clone());
                Ok(StageOutcome::Staged {
                    id: format!("mock-{}", staged.len()),
                })
            })
            .collect()
    }
}
