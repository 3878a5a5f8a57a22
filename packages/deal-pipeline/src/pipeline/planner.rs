//! Query planner - decides which searches to spend the query budget on.
//!
//! One provider call only surfaces the top of one result list. Walking a
//! few sort orders and pages finds discounted items a single call misses.
//! Plans are pure and deterministic: no I/O, no randomness.

use std::collections::HashSet;

use crate::error::{DealError, Result};
use crate::types::config::{validate_max_queries, PlannerConfig};
use crate::types::query::{QuerySpec, SeedQuery, SortHint};

#[derive(Debug, Clone, Default)]
pub struct QueryPlanner {
    config: PlannerConfig,
}

impl QueryPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Distinct specs available for one keyword.
    pub fn variation_count(&self) -> usize {
        self.config.max_pages as usize * SortHint::ALL.len()
    }

    /// Plan up to `max_queries` searches for one keyword.
    ///
    /// Order is page-major: every sort hint for page 0, then page 1, and so
    /// on. Fewer specs come back only when the variations run out.
    pub fn plan(
        &self,
        keyword: &str,
        category: Option<&str>,
        max_queries: usize,
    ) -> Result<Vec<QuerySpec>> {
        self.plan_seed(&SeedQuery::new(keyword), category, max_queries)
    }

    /// Plan for one seed. The seed's category wins over `category`.
    pub fn plan_seed(
        &self,
        seed: &SeedQuery,
        category: Option<&str>,
        max_queries: usize,
    ) -> Result<Vec<QuerySpec>> {
        validate_max_queries(max_queries)?;
        self.validate()?;

        let keyword = seed.keyword.trim();
        if keyword.is_empty() {
            return Err(DealError::invalid("keyword must not be blank"));
        }
        let category = clean_category(seed.category.as_deref()).or(clean_category(category));

        let specs: Vec<QuerySpec> = (0..self.config.max_pages)
            .flat_map(|page| SortHint::ALL.into_iter().map(move |sort| (page, sort)))
            .take(max_queries)
            .map(|(page, sort)| {
                let mut spec = QuerySpec::new(keyword)
                    .with_category(category)
                    .with_sort(sort)
                    .with_page(page)
                    .with_max_price(seed.max_price);
                spec.on_sale = self.config.on_sale;
                spec
            })
            .collect();

        tracing::debug!(keyword, planned = specs.len(), max_queries, "Planned queries");
        Ok(specs)
    }

    /// Plan for several seed keywords sharing one budget.
    pub fn plan_many(
        &self,
        keywords: &[String],
        category: Option<&str>,
        max_queries: usize,
    ) -> Result<Vec<QuerySpec>> {
        let seeds: Vec<SeedQuery> = keywords.iter().map(SeedQuery::new).collect();
        self.plan_seeds(&seeds, category, max_queries)
    }

    /// Plan for several seeds sharing one budget.
    ///
    /// Seeds are deduplicated by keyword case-insensitively (first wins,
    /// blanks are skipped) and their plans interleaved round-robin, so the
    /// budget is spread across seeds before going deep on any one of them.
    pub fn plan_seeds(
        &self,
        seeds: &[SeedQuery],
        category: Option<&str>,
        max_queries: usize,
    ) -> Result<Vec<QuerySpec>> {
        validate_max_queries(max_queries)?;

        let unique = unique_seeds(seeds);
        if unique.is_empty() {
            return Err(DealError::invalid("no keyword to plan queries for"));
        }

        let plans = unique
            .iter()
            .map(|seed| self.plan_seed(seed, category, max_queries))
            .collect::<Result<Vec<_>>>()?;

        let depth = plans.iter().map(Vec::len).max().unwrap_or(0);
        let specs: Vec<QuerySpec> = (0..depth)
            .flat_map(|round| plans.iter().filter_map(move |plan| plan.get(round)))
            .take(max_queries)
            .cloned()
            .collect();

        tracing::info!(
            keywords = unique.len(),
            planned = specs.len(),
            max_queries,
            "Planned queries for seed keywords"
        );
        Ok(specs)
    }

    fn validate(&self) -> Result<()> {
        if self.config.max_pages == 0 {
            return Err(DealError::invalid("planner max_pages must be positive"));
        }
        Ok(())
    }
}

/// Seeds with a non-blank keyword, first occurrence of each keyword kept.
pub fn unique_seeds(seeds: &[SeedQuery]) -> Vec<SeedQuery> {
    let mut seen = HashSet::new();
    seeds
        .iter()
        .filter_map(|seed| {
            let keyword = seed.keyword.trim();
            if keyword.is_empty() || !seen.insert(keyword.to_lowercase()) {
                return None;
            }
            let mut seed = seed.clone();
            seed.keyword = keyword.to_string();
            Some(seed)
        })
        .collect()
}

/// Trimmed category, `None` when blank.
pub fn clean_category(category: Option<&str>) -> Option<&str> {
    category.map(str::trim).filter(|c| !c.is_empty())
}
