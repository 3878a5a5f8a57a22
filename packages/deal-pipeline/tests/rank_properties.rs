//! Property tests for the filter/rank engine and the normalizer's discount.

use std::collections::{HashMap, HashSet};

use deal_pipeline::{compute_discount, rank_deals, Deal, RankConfig, SortKey};
use proptest::prelude::*;

fn deal(index: usize, title: u8, link: u8, price: u32, discount: u8, rating: Option<u8>) -> Deal {
    Deal {
        title: format!("Product {}", title),
        current_price: f64::from(price),
        original_price: None,
        discount_percent: discount,
        rating: rating.map(|r| f64::from(r) / 10.0),
        source: "Shop".to_string(),
        link: Some(format!("https://shop.example/{}", link)),
        category: if index % 2 == 0 {
            Some("Elektronik".to_string())
        } else {
            Some("Giyim".to_string())
        },
        query_keyword: "kw".to_string(),
        currency: "TRY".to_string(),
        thumbnail: None,
        reviews: None,
        product_id: Some(index.to_string()),
        discount_tag: None,
        delivery: None,
        condition: None,
    }
}

fn deals_strategy() -> impl Strategy<Value = Vec<Deal>> {
    prop::collection::vec(
        (0u8..6, 0u8..3, 1u32..1000, 0u8..=100, prop::option::of(0u8..=50)),
        0..40,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (title, link, price, discount, rating))| {
                deal(i, title, link, price, discount, rating)
            })
            .collect()
    })
}

fn sort_key_strategy() -> impl Strategy<Value = SortKey> {
    prop_oneof![
        Just(SortKey::Discount),
        Just(SortKey::Price),
        Just(SortKey::Rating),
        Just(SortKey::Relevance),
    ]
}

proptest! {
    /// Every output deal passes the discount and category filters.
    #[test]
    fn ranked_deals_pass_filters(
        deals in deals_strategy(),
        min_discount in 0u32..=100,
        filter_category in any::<bool>(),
        sort_by in sort_key_strategy(),
    ) {
        let mut config = RankConfig::new().with_min_discount(min_discount).with_sort(sort_by);
        if filter_category {
            config = config.with_category("elektronik");
        }
        let ranked = rank_deals(deals, &config).unwrap();

        for deal in &ranked {
            prop_assert!(u32::from(deal.discount_percent) >= min_discount);
            if filter_category {
                prop_assert_eq!(deal.category.as_deref(), Some("Elektronik"));
            }
        }
    }

    /// No two output deals share an identity.
    #[test]
    fn ranked_deals_are_unique(deals in deals_strategy(), sort_by in sort_key_strategy()) {
        let ranked = rank_deals(deals, &RankConfig::new().with_sort(sort_by)).unwrap();
        let identities: HashSet<_> = ranked.iter().map(Deal::identity).collect();
        prop_assert_eq!(identities.len(), ranked.len());
    }

    /// Output is monotonic in the sort key.
    #[test]
    fn ranked_deals_are_sorted(deals in deals_strategy(), sort_by in sort_key_strategy()) {
        let ranked = rank_deals(deals, &RankConfig::new().with_sort(sort_by)).unwrap();

        for pair in ranked.windows(2) {
            match sort_by {
                SortKey::Discount => prop_assert!(pair[0].discount_percent >= pair[1].discount_percent),
                SortKey::Price => prop_assert!(pair[0].current_price <= pair[1].current_price),
                SortKey::Rating => {
                    let a = pair[0].rating.unwrap_or(f64::NEG_INFINITY);
                    let b = pair[1].rating.unwrap_or(f64::NEG_INFINITY);
                    prop_assert!(a >= b);
                }
                SortKey::Relevance => {}
            }
        }
    }

    /// Ties keep the order in which their identity first appeared.
    #[test]
    fn discount_sort_is_stable(deals in deals_strategy()) {
        let mut first_seen = HashMap::new();
        for (index, deal) in deals.iter().enumerate() {
            first_seen.entry(deal.identity()).or_insert(index);
        }

        let ranked = rank_deals(deals, &RankConfig::new()).unwrap();

        for pair in ranked.windows(2) {
            if pair[0].discount_percent == pair[1].discount_percent {
                prop_assert!(first_seen[&pair[0].identity()] < first_seen[&pair[1].identity()]);
            }
        }
    }

    /// Same input and configuration, same output.
    #[test]
    fn ranking_is_deterministic(
        deals in deals_strategy(),
        sort_by in sort_key_strategy(),
        limit in prop::option::of(1usize..20),
    ) {
        let mut config = RankConfig::new().with_sort(sort_by);
        config.limit = limit;

        let first = rank_deals(deals.clone(), &config).unwrap();
        let second = rank_deals(deals, &config).unwrap();
        prop_assert_eq!(first, second);
    }

    /// The limit caps the output size.
    #[test]
    fn limit_caps_output(deals in deals_strategy(), limit in 1usize..10) {
        let ranked = rank_deals(deals, &RankConfig::new().with_limit(limit)).unwrap();
        prop_assert!(ranked.len() <= limit);
    }

    /// Discount stays within 0-100 and is zero unless the price dropped.
    #[test]
    fn discount_is_bounded(current in 0.0f64..10_000.0, original in prop::option::of(0.0f64..10_000.0)) {
        let discount = compute_discount(current, original);
        prop_assert!(discount <= 100);
        match original {
            Some(o) if o > current => {}
            _ => prop_assert_eq!(discount, 0),
        }
    }
}

#[test]
fn test_discount_examples() {
    assert_eq!(compute_discount(80.0, Some(100.0)), 20);
    assert_eq!(compute_discount(100.0, Some(80.0)), 0);
}
