//! Filter/rank engine.
//!
//! Runs in a fixed order so output is deterministic:
//! category filter → discount filter → dedup → stable sort → limit.
//! Deals are moved through untouched; the engine only drops and reorders.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::error::Result;
use crate::types::config::{RankConfig, SortKey};
use crate::types::deal::{Deal, DealIdentity};

/// A validated ranking configuration.
#[derive(Debug, Clone)]
pub struct RankEngine {
    config: RankConfig,
}

impl RankEngine {
    /// Fails with `InvalidConfiguration` before any deal is looked at.
    pub fn new(config: RankConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RankConfig {
        &self.config
    }

    pub fn rank(&self, deals: Vec<Deal>) -> Vec<Deal> {
        let before = deals.len();

        let filtered: Vec<Deal> = deals
            .into_iter()
            .filter(|d| matches_category(d, self.config.category.as_deref()))
            .filter(|d| u32::from(d.discount_percent) >= self.config.min_discount)
            .collect();
        let after_filters = filtered.len();

        let mut ranked = deduplicate(filtered);
        sort_deals(&mut ranked, self.config.sort_by);

        if let Some(limit) = self.config.limit {
            ranked.truncate(limit);
        }

        tracing::debug!(
            input = before,
            after_filters,
            output = ranked.len(),
            sort_by = %self.config.sort_by,
            "Ranked deals"
        );

        ranked
    }
}

/// Validate the configuration, then rank.
pub fn rank_deals(deals: Vec<Deal>, config: &RankConfig) -> Result<Vec<Deal>> {
    Ok(RankEngine::new(config.clone())?.rank(deals))
}

fn matches_category(deal: &Deal, category: Option<&str>) -> bool {
    match category {
        None => true,
        Some(wanted) => deal
            .category
            .as_deref()
            .is_some_and(|c| c.to_lowercase() == wanted.to_lowercase()),
    }
}

/// Keep one deal per identity.
///
/// The winner has the highest discount, then the lowest price; on a full tie
/// the first one seen stays. The winner takes the slot of the group's first
/// member, so relevance order is preserved.
pub fn deduplicate(deals: Vec<Deal>) -> Vec<Deal> {
    let mut slots: HashMap<DealIdentity, usize> = HashMap::new();
    let mut kept: Vec<Deal> = Vec::with_capacity(deals.len());

    for deal in deals {
        let identity = deal.identity();
        if let Some(&slot) = slots.get(&identity) {
            if beats(&deal, &kept[slot]) {
                kept[slot] = deal;
            }
        } else {
            slots.insert(identity, kept.len());
            kept.push(deal);
        }
    }

    kept
}

fn beats(candidate: &Deal, incumbent: &Deal) -> bool {
    match candidate.discount_percent.cmp(&incumbent.discount_percent) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => candidate.current_price < incumbent.current_price,
    }
}

/// Stable sort by key. `Relevance` leaves the order alone.
pub fn sort_deals(deals: &mut [Deal], sort_by: SortKey) {
    match sort_by {
        SortKey::Discount => deals.sort_by(|a, b| b.discount_percent.cmp(&a.discount_percent)),
        SortKey::Price => deals.sort_by(|a, b| a.current_price.total_cmp(&b.current_price)),
        SortKey::Rating => deals.sort_by(rating_descending),
        SortKey::Relevance => {}
    }
}

fn rating_descending(a: &Deal, b: &Deal) -> Ordering {
    match (a.rating, b.rating) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
