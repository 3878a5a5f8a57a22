//! Rejection channel and run summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::deal::Deal;
use crate::types::query::QuerySpec;

/// Why a raw record did not become a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Neither title nor link.
    MissingIdentity,
    /// No price field at all.
    MissingPrice,
    /// Price present but not a positive number.
    UnparseablePrice,
}

/// A dropped raw record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub reason: RejectReason,
    pub title: Option<String>,
}

impl Rejection {
    pub fn new(reason: RejectReason, title: Option<String>) -> Self {
        Self { reason, title }
    }
}

/// Normalizer output for one provider response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBatch {
    pub deals: Vec<Deal>,
    pub rejections: Vec<Rejection>,
}

impl NormalizedBatch {
    pub fn dropped(&self) -> usize {
        self.rejections.len()
    }
}

/// A failed query, kept for the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryFailure {
    pub query: QuerySpec,
    pub error: String,
    pub fatal: bool,
}

/// A deal the approval store did not accept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagingFailure {
    pub title: String,
    pub query_keyword: String,
    pub error: String,
}

/// What happened during a run, for logs and the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub keywords: Vec<String>,
    pub queries_planned: usize,
    pub queries_succeeded: usize,
    pub queries_failed: usize,
    /// Abandoned after a fatal provider error.
    pub queries_skipped: usize,
    pub records_received: usize,
    pub deals_normalized: usize,
    pub deals_with_discount: usize,
    pub rejections: Vec<Rejection>,
    pub deals_ranked: usize,
    pub staged: usize,
    pub already_staged: usize,
    pub staging_failures: Vec<StagingFailure>,
    pub query_failures: Vec<QueryFailure>,
    pub dry_run: bool,
}

impl RunSummary {
    pub fn new(keywords: Vec<String>, queries_planned: usize, dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            keywords,
            queries_planned,
            queries_succeeded: 0,
            queries_failed: 0,
            queries_skipped: 0,
            records_received: 0,
            deals_normalized: 0,
            deals_with_discount: 0,
            rejections: Vec::new(),
            deals_ranked: 0,
            staged: 0,
            already_staged: 0,
            staging_failures: Vec::new(),
            query_failures: Vec::new(),
            dry_run,
        }
    }

    pub fn dropped(&self) -> usize {
        self.rejections.len()
    }

    pub fn queries_attempted(&self) -> usize {
        self.queries_succeeded + self.queries_failed
    }

    pub fn record_batch(&mut self, received: usize, batch: &NormalizedBatch) {
        self.queries_succeeded += 1;
        self.records_received += received;
        self.deals_normalized += batch.deals.len();
        self.deals_with_discount += batch.deals.iter().filter(|d| d.has_discount()).count();
        self.rejections.extend(batch.rejections.iter().cloned());
    }

    pub fn record_query_failure(&mut self, query: &QuerySpec, error: String, fatal: bool) {
        self.queries_failed += 1;
        self.query_failures.push(QueryFailure {
            query: query.clone(),
            error,
            fatal,
        });
    }

    pub fn record_staging_failure(&mut self, deal: &Deal, error: String) {
        self.staging_failures.push(StagingFailure {
            title: deal.title.clone(),
            query_keyword: deal.query_keyword.clone(),
            error,
        });
    }

    /// Error lines tagged by query keyword, in the order they happened.
    pub fn errors(&self) -> Vec<String> {
        self.query_failures
            .iter()
            .map(|f| format!("Query '{}': {}", f.query.keyword, f.error))
            .chain(
                self.staging_failures
                    .iter()
                    .map(|f| format!("Staging '{}': {}", f.title, f.error)),
            )
            .collect()
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }
}
