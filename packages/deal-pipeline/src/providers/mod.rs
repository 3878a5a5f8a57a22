//! Search provider implementations.

pub mod rate_limited;
pub mod serpapi;

pub use rate_limited::RateLimitedProvider;
pub use serpapi::SerpApiProvider;
