//! Storage Module
//!
//! In-memory stores shared by the API handlers and the solver: the live
//! intent pool and the match history. Nothing is persisted across restarts.

pub mod intent_pool;
pub mod match_history;

// Re-export for convenience
pub use intent_pool::{IntentPool, PoolEntry, PoolError, SlotIndex};
pub use match_history::{HistoryWriter, MatchHistory};
