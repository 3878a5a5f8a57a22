//! The deal pipeline - main entry point for a discovery run.
//!
//! One run resolves seed keywords, plans queries, searches them one at a
//! time, normalizes every response into a single accumulator, ranks once
//! and stages the result for human review.
//!
//! A run owns its accumulator and summary, so separate runs never share
//! mutable state and can execute in parallel without coordination.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{DealError, Result};
use crate::pipeline::normalize::{normalize_batch, NormalizeContext};
use crate::pipeline::planner::{unique_seeds, QueryPlanner};
use crate::pipeline::rank::RankEngine;
use crate::traits::{
    alerts::{AlertSource, DealAlert},
    approval::{ApprovalStore, StageOutcome},
    keywords::KeywordSource,
    provider::SearchProvider,
};
use crate::types::{
    config::{PipelineConfig, SearchRequest},
    deal::Deal,
    query::SeedQuery,
    summary::RunSummary,
};

/// Ranked deals plus what happened on the way.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub deals: Vec<Deal>,
    pub summary: RunSummary,
}

/// Discovery pipeline over a search provider and an approval store.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = DealPipeline::new(provider, store, PipelineConfig::default());
///
/// let request = SearchRequest::for_keyword("kulaklık").with_min_discount(20);
/// let output = pipeline.run(&request).await?;
///
/// for deal in &output.deals {
///     println!("{} -{}%", deal.title, deal.discount_percent);
/// }
/// ```
pub struct DealPipeline<P: SearchProvider, S: ApprovalStore> {
    provider: P,
    store: S,
    alerts: Option<Arc<dyn AlertSource>>,
    keywords: Option<Arc<dyn KeywordSource>>,
    planner: QueryPlanner,
    config: PipelineConfig,
}

impl<P: SearchProvider, S: ApprovalStore> DealPipeline<P, S> {
    pub fn new(provider: P, store: S, config: PipelineConfig) -> Self {
        Self {
            provider,
            store,
            alerts: None,
            keywords: None,
            planner: QueryPlanner::new(config.planner.clone()),
            config,
        }
    }

    /// Seed from active deal alerts when a request has no keyword.
    pub fn with_alert_source(mut self, source: Arc<dyn AlertSource>) -> Self {
        self.alerts = Some(source);
        self
    }

    /// Seed from popular keywords when a request has no keyword.
    pub fn with_keyword_source(mut self, source: Arc<dyn KeywordSource>) -> Self {
        self.keywords = Some(source);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one discovery pass.
    ///
    /// Fails only on invalid configuration or unavailable seed sources
    /// (before any query is sent), or when no query at all succeeds.
    /// Everything else lands in the summary.
    pub async fn run(&self, request: &SearchRequest) -> Result<PipelineOutput> {
        request.validate()?;
        let engine = RankEngine::new(request.rank_config())?;

        let seeds = self.resolve_seeds(request).await?;
        let plan =
            self.planner
                .plan_seeds(&seeds, request.category_filter(), request.max_queries)?;
        let keywords: Vec<String> = seeds.into_iter().map(|seed| seed.keyword).collect();

        info!(
            keywords = ?keywords,
            planned = plan.len(),
            dry_run = request.dry_run,
            "Starting deal run"
        );

        let mut summary = RunSummary::new(keywords, plan.len(), request.dry_run);
        let mut accumulated: Vec<Deal> = Vec::new();
        let mut last_error: Option<String> = None;

        for (index, spec) in plan.iter().enumerate() {
            match self.provider.search(spec).await {
                Ok(raws) => {
                    let received = raws.len();
                    let ctx = NormalizeContext::for_query(spec, &self.config.currency);
                    let batch = normalize_batch(raws, &ctx);
                    debug!(
                        keyword = %spec.keyword,
                        sort = ?spec.sort,
                        page = spec.page,
                        received,
                        normalized = batch.deals.len(),
                        dropped = batch.dropped(),
                        "Query complete"
                    );
                    summary.record_batch(received, &batch);
                    accumulated.extend(batch.deals);
                }
                Err(e) => {
                    let fatal = e.is_fatal();
                    let message = e.to_string();
                    warn!(
                        keyword = %spec.keyword,
                        sort = ?spec.sort,
                        page = spec.page,
                        fatal,
                        error = %message,
                        "Query failed"
                    );
                    summary.record_query_failure(spec, message.clone(), fatal);
                    last_error = Some(message);

                    if fatal {
                        summary.queries_skipped = plan.len() - index - 1;
                        warn!(
                            skipped = summary.queries_skipped,
                            "Provider error is fatal, abandoning remaining queries"
                        );
                        break;
                    }
                }
            }
        }

        if summary.queries_succeeded == 0 {
            return Err(DealError::ProviderUnavailable {
                attempted: summary.queries_attempted(),
                last_error: last_error.unwrap_or_else(|| "no queries were run".to_string()),
            });
        }

        let deals = engine.rank(accumulated);
        summary.deals_ranked = deals.len();

        if request.dry_run {
            info!(ranked = deals.len(), "Dry run, skipping approval store");
        } else {
            self.stage(&deals, &mut summary).await;
        }

        summary.finish();
        info!(
            succeeded = summary.queries_succeeded,
            failed = summary.queries_failed,
            skipped = summary.queries_skipped,
            normalized = summary.deals_normalized,
            dropped = summary.dropped(),
            ranked = summary.deals_ranked,
            staged = summary.staged,
            already_staged = summary.already_staged,
            staging_failed = summary.staging_failures.len(),
            "Deal run finished"
        );

        Ok(PipelineOutput { deals, summary })
    }

    /// The caller's keyword, else deal-alert seeds followed by popular
    /// keywords. A failing source is skipped while another one still yields
    /// seeds.
    async fn resolve_seeds(&self, request: &SearchRequest) -> Result<Vec<SeedQuery>> {
        if let Some(keyword) = request.keyword.as_deref() {
            let keyword = keyword.trim();
            if keyword.is_empty() {
                return Err(DealError::invalid("keyword must not be blank"));
            }
            return Ok(vec![SeedQuery::new(keyword)]);
        }

        if self.alerts.is_none() && self.keywords.is_none() {
            return Err(DealError::invalid(
                "no keyword given and no seed source configured",
            ));
        }

        let mut seeds = Vec::new();
        let mut failures = Vec::new();

        if let Some(source) = &self.alerts {
            match source.active_alerts().await {
                Ok(alerts) => {
                    let before = seeds.len();
                    seeds.extend(alerts.iter().filter_map(DealAlert::seed));
                    info!(count = seeds.len() - before, "Seeded keywords from deal alerts");
                }
                Err(e) => {
                    warn!(error = %e, "Deal alerts unavailable");
                    failures.push(format!("deal alerts: {}", e));
                }
            }
        }

        if let Some(source) = &self.keywords {
            match source.popular_keywords(self.config.seed_keywords).await {
                Ok(popular) => {
                    info!(count = popular.len(), "Seeded keywords from popular deals");
                    seeds.extend(popular.into_iter().map(|k| SeedQuery::new(k.keyword)));
                }
                Err(e) => {
                    warn!(error = %e, "Popular keywords unavailable");
                    failures.push(format!("popular keywords: {}", e));
                }
            }
        }

        let seeds = unique_seeds(&seeds);
        if !seeds.is_empty() {
            return Ok(seeds);
        }
        if !failures.is_empty() {
            return Err(DealError::SeedSourceUnavailable {
                reason: failures.join("; "),
            });
        }
        Err(DealError::invalid(
            "no keyword given and no deal alerts or popular keywords available",
        ))
    }

    async fn stage(&self, deals: &[Deal], summary: &mut RunSummary) {
        if deals.is_empty() {
            return;
        }

        let mut outcomes = self.store.stage(deals).await.into_iter();

        for deal in deals {
            match outcomes.next() {
                Some(Ok(StageOutcome::Staged { id })) => {
                    debug!(title = %deal.title, id = %id, "Staged deal");
                    summary.staged += 1;
                }
                Some(Ok(StageOutcome::AlreadyStaged)) => {
                    debug!(title = %deal.title, "Deal already staged");
                    summary.already_staged += 1;
                }
                Some(Err(e)) => {
                    warn!(title = %deal.title, error = %e, "Failed to stage deal");
                    summary.record_staging_failure(deal, e.to_string());
                }
                None => {
                    summary.record_staging_failure(
                        deal,
                        "approval store returned no outcome".to_string(),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::error::{ProviderError, StoreError, StoreResult};
    use crate::stores::memory::{StaticAlerts, StaticKeywords};
    use crate::traits::keywords::KeywordFrequency;
    use crate::testing::{MockApprovalStore, MockProvider};
    use crate::types::raw::RawResult;

    struct DownKeywords;

    #[async_trait]
    impl KeywordSource for DownKeywords {
        async fn popular_keywords(&self, _limit: usize) -> StoreResult<Vec<KeywordFrequency>> {
            Err(StoreError::Rejected {
                status: 503,
                message: "service unavailable".into(),
            })
        }
    }

    fn discounted(title: &str, price: f64, original: f64) -> RawResult {
        RawResult::new()
            .with_title(title)
            .with_price(price)
            .with_original_price(original)
            .with_source("Shop")
            .with_link(format!("https://shop.example/{}", title))
    }

    #[tokio::test]
    async fn test_run_ranks_and_stages() {
        let provider = MockProvider::new().with_results(
            "kulaklık",
            vec![discounted("a", 90.0, 100.0), discounted("b", 50.0, 100.0)],
        );
        let store = MockApprovalStore::new();
        let pipeline = DealPipeline::new(provider, store, PipelineConfig::default());

        let output = pipeline
            .run(&SearchRequest::for_keyword("kulaklık").with_max_queries(2))
            .await
            .unwrap();

        assert_eq!(output.deals.len(), 2);
        assert_eq!(output.deals[0].title, "b");
        assert_eq!(output.summary.queries_succeeded, 2);
        assert_eq!(output.summary.staged, 2);
        assert_eq!(pipeline.store().staged_titles(), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_seeds_from_keyword_source() {
        let provider = MockProvider::new()
            .with_results("telefon", vec![discounted("phone", 80.0, 100.0)])
            .with_results("laptop", vec![discounted("laptop", 70.0, 100.0)]);
        let pipeline = DealPipeline::new(provider, MockApprovalStore::new(), PipelineConfig::default())
            .with_keyword_source(Arc::new(StaticKeywords::new(["telefon", "laptop"])));

        let output = pipeline
            .run(&SearchRequest::default().with_max_queries(2).dry_run())
            .await
            .unwrap();

        assert_eq!(output.summary.keywords, vec!["telefon", "laptop"]);
        let keywords: Vec<String> = pipeline
            .provider()
            .calls()
            .into_iter()
            .map(|q| q.keyword)
            .collect();
        assert_eq!(keywords, vec!["telefon", "laptop"]);
    }

    #[tokio::test]
    async fn test_no_keyword_and_no_source() {
        let pipeline = DealPipeline::new(
            MockProvider::new(),
            MockApprovalStore::new(),
            PipelineConfig::default(),
        );
        let err = pipeline.run(&SearchRequest::default()).await.unwrap_err();
        assert!(matches!(err, DealError::InvalidConfiguration { .. }));
        assert!(pipeline.provider().calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_keyword_source() {
        let pipeline = DealPipeline::new(
            MockProvider::new(),
            MockApprovalStore::new(),
            PipelineConfig::default(),
        )
        .with_keyword_source(Arc::new(StaticKeywords::new(Vec::<String>::new())));

        let err = pipeline.run(&SearchRequest::default()).await.unwrap_err();
        assert!(matches!(err, DealError::InvalidConfiguration { .. }));
    }

    #[tokio::test]
    async fn test_non_fatal_failure_skips_one_query() {
        let provider = MockProvider::new()
            .with_results("tv", vec![discounted("tv", 60.0, 100.0)])
            .fail_call(
                0,
                ProviderError::Api {
                    status: Some(500),
                    message: "boom".into(),
                },
            );
        let pipeline = DealPipeline::new(provider, MockApprovalStore::new(), PipelineConfig::default());

        let output = pipeline
            .run(&SearchRequest::for_keyword("tv").with_max_queries(3).dry_run())
            .await
            .unwrap();

        assert_eq!(output.summary.queries_failed, 1);
        assert_eq!(output.summary.queries_succeeded, 2);
        assert_eq!(output.summary.queries_skipped, 0);
        assert_eq!(output.deals.len(), 1);
        assert_eq!(output.summary.errors().len(), 1);
    }

    #[tokio::test]
    async fn test_alert_seeds_run_before_popular_keywords() {
        let alerts = StaticAlerts::new([
            DealAlert::new("Airfryer")
                .with_category("Ev Aletleri")
                .with_max_price(3000.0),
            DealAlert {
                name: None,
                category: None,
                tag: None,
                max_price: None,
            },
        ]);
        let pipeline = DealPipeline::new(
            MockProvider::new(),
            MockApprovalStore::new(),
            PipelineConfig::default(),
        )
        .with_alert_source(Arc::new(alerts))
        .with_keyword_source(Arc::new(StaticKeywords::new([
            "airfryer ev aletleri",
            "telefon",
        ])));

        let output = pipeline
            .run(&SearchRequest::default().with_max_queries(2).dry_run())
            .await
            .unwrap();

        assert_eq!(output.summary.keywords, vec!["Airfryer Ev Aletleri", "telefon"]);
        let calls = pipeline.provider().calls();
        assert_eq!(calls[0].keyword, "Airfryer Ev Aletleri");
        assert_eq!(calls[0].category.as_deref(), Some("Ev Aletleri"));
        assert_eq!(calls[0].max_price(), Some(3000.0));
        assert_eq!(calls[1].keyword, "telefon");
        assert_eq!(calls[1].max_price(), None);
    }

    #[tokio::test]
    async fn test_explicit_keyword_ignores_alerts() {
        let pipeline = DealPipeline::new(
            MockProvider::new(),
            MockApprovalStore::new(),
            PipelineConfig::default(),
        )
        .with_alert_source(Arc::new(StaticAlerts::new([DealAlert::new("Airfryer")])));

        pipeline
            .run(&SearchRequest::for_keyword("tv").with_max_queries(1).dry_run())
            .await
            .unwrap();

        assert_eq!(pipeline.provider().calls()[0].keyword, "tv");
    }

    #[tokio::test]
    async fn test_failed_keyword_source_is_not_a_config_error() {
        let pipeline = DealPipeline::new(
            MockProvider::new(),
            MockApprovalStore::new(),
            PipelineConfig::default(),
        )
        .with_keyword_source(Arc::new(DownKeywords));

        let err = pipeline.run(&SearchRequest::default()).await.unwrap_err();
        match err {
            DealError::SeedSourceUnavailable { reason } => {
                assert!(reason.contains("popular keywords"));
                assert!(reason.contains("503"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(pipeline.provider().calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_keyword_source_falls_back_to_alerts() {
        let pipeline = DealPipeline::new(
            MockProvider::new(),
            MockApprovalStore::new(),
            PipelineConfig::default(),
        )
        .with_alert_source(Arc::new(StaticAlerts::new([DealAlert::new("Kulaklık")])))
        .with_keyword_source(Arc::new(DownKeywords));

        let output = pipeline
            .run(&SearchRequest::default().with_max_queries(1).dry_run())
            .await
            .unwrap();

        assert_eq!(output.summary.keywords, vec!["Kulaklık"]);
    }
}
