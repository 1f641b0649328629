//! Intent Pool Service Library
//!
//! This crate provides a service where makers submit signed intents (give up
//! to X of one asset for at least Y of another) into a shared pool, and a
//! first-fit solver clears compatible pairs into an append-only match
//! history.

pub mod api;
pub mod config;
pub mod crypto;
pub mod signing;
pub mod solver;
pub mod storage;
pub mod submission;
pub mod types;

// Re-export commonly used types
pub use config::{ApiConfig, Config, LoggingConfig, SolverConfig};
pub use solver::{MatchingSolver, SolveOutcome};
pub use storage::{IntentPool, MatchHistory, PoolError};
pub use submission::{SubmissionError, SubmitIntentRequest};
pub use types::{Asset, Constraints, Deadline, GetSide, GiveSide, Intent, Match};
