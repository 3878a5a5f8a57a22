//! Approval store, alert source and keyword source implementations.

pub mod memory;
pub mod supabase;

pub use memory::{MemoryApprovalStore, StaticAlerts, StaticKeywords};
pub use supabase::SupabaseStore;
