//! REST API Server Module
//!
//! This module provides the REST API for the intent pool service: signed
//! intent submission, pool and history listings, and the solve trigger.

// Generic shared code (envelope, rejections, CORS, server)
mod generic;

// Intent, solve and match handlers
mod intents;

// Re-export ApiServer for convenience
pub use generic::ApiServer;
// Re-export ApiResponse for testing
pub use generic::ApiResponse;
