//! Deal pipeline: planning, normalization, ranking and run orchestration.

pub mod keywords;
pub mod normalize;
pub mod planner;
pub mod price;
pub mod rank;
pub mod run;

pub use keywords::keywords_from_titles;
pub use normalize::{compute_discount, normalize, normalize_batch, NormalizeContext};
pub use planner::QueryPlanner;
pub use price::{parse_amount, parse_amount_text};
pub use rank::{deduplicate, rank_deals, sort_deals, RankEngine};
pub use run::{DealPipeline, PipelineOutput};
