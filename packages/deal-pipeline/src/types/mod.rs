//! Data types for the deal pipeline.

pub mod config;
pub mod deal;
pub mod query;
pub mod raw;
pub mod summary;
