//! Normalizer - the single boundary from raw provider records to `Deal`.

use serde_json::Value;

use crate::pipeline::price::parse_amount;
use crate::types::deal::{Deal, PLACEHOLDER_TITLE};
use crate::types::query::QuerySpec;
use crate::types::raw::RawResult;
use crate::types::summary::{NormalizedBatch, RejectReason, Rejection};

/// Source name used when the provider omits one.
pub const UNKNOWN_SOURCE: &str = "Unknown";

const MAX_RATING: f64 = 5.0;

/// Provenance attached to every deal from one query.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeContext {
    pub keyword: String,
    pub category: Option<String>,
    pub currency: String,
}

impl NormalizeContext {
    pub fn new(keyword: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            category: None,
            currency: currency.into(),
        }
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    pub fn for_query(query: &QuerySpec, currency: &str) -> Self {
        Self::new(&query.keyword, currency).with_category(query.category.clone())
    }
}

/// Normalize one raw record, or say why it was dropped.
pub fn normalize(raw: &RawResult, ctx: &NormalizeContext) -> Result<Deal, Rejection> {
    let title = non_blank(raw.title.as_deref());
    let link = non_blank(raw.link.as_deref()).map(canonical_link);

    if title.is_none() && link.is_none() {
        return Err(Rejection::new(RejectReason::MissingIdentity, None));
    }

    let current_price = match raw.price.as_ref().filter(|v| !v.is_null()) {
        None => return Err(Rejection::new(RejectReason::MissingPrice, title)),
        Some(value) => match parse_amount(value).filter(|p| *p > 0.0) {
            Some(price) => price,
            None => return Err(Rejection::new(RejectReason::UnparseablePrice, title)),
        },
    };

    let original_price = raw
        .original_price
        .as_ref()
        .and_then(parse_amount)
        .filter(|p| *p > 0.0);

    Ok(Deal {
        title: title.unwrap_or_else(|| PLACEHOLDER_TITLE.to_string()),
        current_price,
        original_price,
        discount_percent: compute_discount(current_price, original_price),
        rating: raw.rating.as_ref().and_then(parse_rating),
        source: non_blank(raw.source.as_deref()).unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
        link,
        category: ctx.category.clone(),
        query_keyword: ctx.keyword.clone(),
        currency: ctx.currency.clone(),
        thumbnail: non_blank(raw.thumbnail.as_deref()),
        reviews: raw.reviews.as_ref().and_then(parse_count),
        product_id: non_blank(raw.product_id.as_deref()),
        discount_tag: non_blank(raw.discount_tag.as_deref()),
        delivery: non_blank(raw.delivery.as_deref()),
        condition: non_blank(raw.condition.as_deref()),
    })
}

/// Normalize a provider response, collecting rejections.
pub fn normalize_batch(
    raws: impl IntoIterator<Item = RawResult>,
    ctx: &NormalizeContext,
) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();

    for raw in raws {
        match normalize(&raw, ctx) {
            Ok(deal) => batch.deals.push(deal),
            Err(rejection) => {
                tracing::debug!(
                    reason = ?rejection.reason,
                    title = ?rejection.title,
                    keyword = %ctx.keyword,
                    "Dropped raw result"
                );
                batch.rejections.push(rejection);
            }
        }
    }

    batch
}

/// Whole-percent discount, 0 unless the original price is above the current one.
pub fn compute_discount(current_price: f64, original_price: Option<f64>) -> u8 {
    match original_price {
        Some(original) if original > current_price && current_price >= 0.0 => {
            let percent = (100.0 * (original - current_price) / original).round();
            percent.clamp(0.0, 100.0) as u8
        }
        _ => 0,
    }
}

fn parse_rating(value: &Value) -> Option<f64> {
    parse_amount(value).filter(|r| (0.0..=MAX_RATING).contains(r))
}

fn parse_count(value: &Value) -> Option<u32> {
    parse_amount(value)
        .filter(|c| *c >= 0.0 && *c <= u32::MAX as f64)
        .map(|c| c.round() as u32)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Canonical URL form when parseable, the trimmed text otherwise.
fn canonical_link(link: String) -> String {
    url::Url::parse(&link)
        .map(|u| u.to_string())
        .unwrap_or(link)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> NormalizeContext {
        NormalizeContext::new("kulaklık", "TRY").with_category(Some("Elektronik".into()))
    }

    fn raw(title: &str, price: impl Into<Value>) -> RawResult {
        RawResult::new()
            .with_title(title)
            .with_price(price)
            .with_link(format!("https://shop.example/{}", title.to_lowercase()))
    }

    #[test]
    fn test_discount_from_prices() {
        let deal = normalize(&raw("Headset", 80).with_original_price(100), &ctx()).unwrap();
        assert_eq!(deal.discount_percent, 20);
        assert_eq!(deal.current_price, 80.0);
        assert_eq!(deal.original_price, Some(100.0));
    }

    #[test]
    fn test_current_above_original_is_zero_discount() {
        let deal = normalize(&raw("Headset", 100).with_original_price(80), &ctx()).unwrap();
        assert_eq!(deal.discount_percent, 0);
        assert_eq!(deal.original_price, Some(80.0));
    }

    #[test]
    fn test_missing_original_price_keeps_record() {
        let deal = normalize(&raw("Headset", 80), &ctx()).unwrap();
        assert_eq!(deal.discount_percent, 0);
        assert!(deal.original_price.is_none());
    }

    #[test]
    fn test_discount_ignores_source_tag() {
        let mut record = raw("Headset", 95).with_original_price(100);
        record.discount_tag = Some("60% OFF".into());
        let deal = normalize(&record, &ctx()).unwrap();
        assert_eq!(deal.discount_percent, 5);
        assert_eq!(deal.discount_tag.as_deref(), Some("60% OFF"));
    }

    #[test]
    fn test_compute_discount_boundaries() {
        assert_eq!(compute_discount(100.0, Some(100.0)), 0);
        assert_eq!(compute_discount(0.0, Some(100.0)), 100);
        assert_eq!(compute_discount(99.6, Some(100.0)), 0);
        assert_eq!(compute_discount(99.4, Some(100.0)), 1);
        assert_eq!(compute_discount(0.4, Some(100.0)), 100);
        assert_eq!(compute_discount(66.5, Some(100.0)), 34);
        assert_eq!(compute_discount(50.0, None), 0);
    }

    #[test]
    fn test_formatted_prices() {
        let record = RawResult::new()
            .with_title("Laptop")
            .with_price("28.999,00 TL")
            .with_original_price("34.999,00 TL");
        let deal = normalize(&record, &ctx()).unwrap();
        assert_eq!(deal.current_price, 28999.0);
        assert_eq!(deal.original_price, Some(34999.0));
        assert_eq!(deal.discount_percent, 17);
    }

    #[test]
    fn test_missing_title_and_link_rejected() {
        let record = RawResult::new().with_price(10);
        let err = normalize(&record, &ctx()).unwrap_err();
        assert_eq!(err.reason, RejectReason::MissingIdentity);

        let blank = RawResult::new().with_title("   ").with_link("").with_price(10);
        assert_eq!(
            normalize(&blank, &ctx()).unwrap_err().reason,
            RejectReason::MissingIdentity
        );
    }

    #[test]
    fn test_link_only_gets_placeholder_title() {
        let record = RawResult::new()
            .with_link("https://shop.example/x")
            .with_price(10);
        let deal = normalize(&record, &ctx()).unwrap();
        assert_eq!(deal.title, PLACEHOLDER_TITLE);
        assert_eq!(deal.link.as_deref(), Some("https://shop.example/x"));
    }

    #[test]
    fn test_price_rejections() {
        let missing = RawResult::new().with_title("No price");
        assert_eq!(
            normalize(&missing, &ctx()).unwrap_err().reason,
            RejectReason::MissingPrice
        );

        let text = RawResult::new().with_title("Ask").with_price("Call for price");
        let err = normalize(&text, &ctx()).unwrap_err();
        assert_eq!(err.reason, RejectReason::UnparseablePrice);
        assert_eq!(err.title.as_deref(), Some("Ask"));

        let zero = RawResult::new().with_title("Free").with_price(0);
        assert_eq!(
            normalize(&zero, &ctx()).unwrap_err().reason,
            RejectReason::UnparseablePrice
        );
    }

    #[test]
    fn test_unparseable_original_price_is_unknown() {
        let record = raw("Mouse", 50).with_original_price("n/a");
        let deal = normalize(&record, &ctx()).unwrap();
        assert!(deal.original_price.is_none());
        assert_eq!(deal.discount_percent, 0);
    }

    #[test]
    fn test_rating_best_effort() {
        let deal = normalize(&raw("A", 10).with_rating("4,7"), &ctx()).unwrap();
        assert_eq!(deal.rating, Some(4.7));

        let deal = normalize(&raw("B", 10).with_rating("great"), &ctx()).unwrap();
        assert!(deal.rating.is_none());

        let deal = normalize(&raw("C", 10).with_rating(47), &ctx()).unwrap();
        assert!(deal.rating.is_none());
    }

    #[test]
    fn test_provenance_and_defaults() {
        let deal = normalize(&raw("Speaker", 10), &ctx()).unwrap();
        assert_eq!(deal.query_keyword, "kulaklık");
        assert_eq!(deal.category.as_deref(), Some("Elektronik"));
        assert_eq!(deal.currency, "TRY");
        assert_eq!(deal.source, UNKNOWN_SOURCE);
    }

    #[test]
    fn test_batch_counts_drops() {
        let raws = vec![
            raw("One", 10).with_original_price(20),
            RawResult::new(),
            raw("Two", "abc"),
            raw("Three", "₺1.499"),
        ];
        let batch = normalize_batch(raws, &ctx());

        assert_eq!(batch.deals.len(), 2);
        assert_eq!(batch.dropped(), 2);
        assert_eq!(batch.deals[0].title, "One");
        assert_eq!(batch.deals[1].current_price, 1499.0);
    }
}
