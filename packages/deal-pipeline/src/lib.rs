//! Shopping deal discovery pipeline.
//!
//! Searches a shopping provider for discounted products, normalizes the
//! loosely typed results into `Deal` records, filters and ranks them, and
//! stages the survivors in an approval store for human review.
//!
//! # Usage
//!
//! ```rust,ignore
//! use deal_pipeline::{DealPipeline, PipelineConfig, SearchRequest, SortKey};
//! use deal_pipeline::testing::{MockApprovalStore, MockProvider};
//!
//! let pipeline = DealPipeline::new(MockProvider::new(), MockApprovalStore::new(), PipelineConfig::default());
//!
//! let request = SearchRequest::for_keyword("kulaklık")
//!     .with_min_discount(20)
//!     .with_sort(SortKey::Price)
//!     .with_limit(10);
//! let output = pipeline.run(&request).await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator abstractions (SearchProvider, ApprovalStore, AlertSource, KeywordSource)
//! - [`types`] - Deal, raw result, query and configuration types
//! - [`pipeline`] - Planner, normalizer, rank engine and run orchestration
//! - [`providers`] - Search providers (SerpApiProvider, RateLimitedProvider)
//! - [`stores`] - Approval stores (MemoryApprovalStore, SupabaseStore)
//! - [`security`] - Credential handling
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod pipeline;
pub mod providers;
pub mod security;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{DealError, ProviderError, StoreError};
pub use traits::{
    alerts::{AlertSource, DealAlert},
    approval::{ApprovalStore, StageOutcome},
    keywords::{KeywordFrequency, KeywordSource},
    provider::SearchProvider,
};
pub use types::{
    config::{PipelineConfig, PlannerConfig, RankConfig, SearchRequest, SortKey},
    deal::{Deal, DealIdentity},
    query::{QuerySpec, SeedQuery, SortHint},
    raw::RawResult,
    summary::{NormalizedBatch, RejectReason, Rejection, RunSummary},
};

// Re-export pipeline components
pub use pipeline::{
    compute_discount, keywords_from_titles, normalize, normalize_batch, rank_deals,
    DealPipeline, NormalizeContext, PipelineOutput, QueryPlanner, RankEngine,
};

// Re-export implementations
pub use providers::{RateLimitedProvider, SerpApiProvider};
pub use security::{SecretString, SupabaseCredentials};
pub use stores::{MemoryApprovalStore, StaticAlerts, StaticKeywords, SupabaseStore};
