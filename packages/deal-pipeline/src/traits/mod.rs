//! Core trait abstractions for the deal pipeline.
//!
//! These traits define the collaborators the pipeline talks to: the search
//! provider, the approval store, the deal-alert source and the
//! popular-keywords source.

pub mod alerts;
pub mod approval;
pub mod keywords;
pub mod provider;
