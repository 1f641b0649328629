//! Generic API structures and handlers
//!
//! Shared response envelope, rejection handling, CORS and the server that
//! wires the intent and solver routes together.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};
use warp::hyper::body::Bytes;
use warp::{
    http::{Method, StatusCode},
    Filter, Rejection, Reply,
};

use crate::config::Config;
use crate::solver::MatchingSolver;
use crate::storage::{IntentPool, MatchHistory};

// ============================================================================
// SHARED REQUEST/RESPONSE STRUCTURES
// ============================================================================

/// Standardized response structure for all API endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data (if successful)
    pub data: Option<T>,
    /// Error message (if failed)
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

// ============================================================================
// WARP FILTER HELPERS
// ============================================================================

/// Injects the intent pool into handlers.
pub fn with_pool(
    pool: Arc<IntentPool>,
) -> impl Filter<Extract = (Arc<IntentPool>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || pool.clone())
}

/// Injects the match history into handlers.
pub fn with_history(
    history: Arc<MatchHistory>,
) -> impl Filter<Extract = (Arc<MatchHistory>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || history.clone())
}

/// Injects the solver into handlers.
pub fn with_solver(
    solver: Arc<MatchingSolver>,
) -> impl Filter<Extract = (Arc<MatchingSolver>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || solver.clone())
}

// ============================================================================
// CORS CONFIGURATION
// ============================================================================

/// Creates a CORS filter based on the configured allowed origins.
fn create_cors_filter(allowed_origins: &[String]) -> warp::cors::Builder {
    let methods = vec![Method::GET, Method::POST, Method::OPTIONS];

    if allowed_origins.iter().any(|origin| origin == "*") {
        warp::cors()
            .allow_any_origin()
            .allow_methods(methods)
            .allow_headers(vec!["content-type"])
    } else {
        let origins: Vec<&str> = allowed_origins.iter().map(|s| s.as_str()).collect();
        warp::cors()
            .allow_origins(origins)
            .allow_methods(methods)
            .allow_headers(vec!["content-type"])
    }
}

// ============================================================================
// REJECTION HANDLER
// ============================================================================

/// Global rejection handler for all API routes.
///
/// Converts warp rejections into the standard envelope with a matching
/// HTTP status code.
pub async fn handle_rejection(rej: Rejection) -> Result<impl Reply, std::convert::Infallible> {
    let (status, message) = if rej.is_not_found() {
        (StatusCode::NOT_FOUND, "Endpoint not found".to_string())
    } else if rej.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else if let Some(err) = rej.find::<warp::reject::PayloadTooLarge>() {
        (StatusCode::PAYLOAD_TOO_LARGE, err.to_string())
    } else if let Some(err) = rej.find::<warp::reject::LengthRequired>() {
        (StatusCode::LENGTH_REQUIRED, err.to_string())
    } else {
        error!("Unhandled rejection: {:?}", rej);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&ApiResponse::<()>::err(message)),
        status,
    ))
}

// ============================================================================
// API SERVER IMPLEMENTATION
// ============================================================================

/// Largest accepted request body.
const MAX_BODY_BYTES: u64 = 64 * 1024;

/// REST API server for the intent pool service.
///
/// Holds handles to the process-wide pool and history; the same handles are
/// shared with the background solver.
pub struct ApiServer {
    /// Service configuration
    config: Arc<Config>,
    /// Live intents
    pool: Arc<IntentPool>,
    /// Cleared matches
    history: Arc<MatchHistory>,
    /// Solver over `pool` and `history`
    solver: Arc<MatchingSolver>,
}

impl ApiServer {
    /// Creates a new API server over the given stores.
    pub fn new(config: Config, pool: Arc<IntentPool>, history: Arc<MatchHistory>) -> Self {
        let solver = Arc::new(MatchingSolver::new(pool.clone(), history.clone()));
        Self {
            config: Arc::new(config),
            pool,
            history,
            solver,
        }
    }

    /// The solver shared with the request handlers.
    pub fn solver(&self) -> Arc<MatchingSolver> {
        self.solver.clone()
    }

    /// Starts the API server and begins handling HTTP requests.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Server stopped
    /// * `Err(anyhow::Error)` - Bind address invalid
    pub async fn run(&self) -> Result<()> {
        let addr = self.config.api.socket_addr()?;
        info!("Starting API server on {}", addr);

        let routes = self.create_routes();
        warp::serve(routes).run(addr).await;

        Ok(())
    }

    /// Creates all API routes for the server.
    pub(crate) fn create_routes(
        &self,
    ) -> impl Filter<Extract = impl warp::Reply, Error = std::convert::Infallible> + Clone {
        use super::intents;

        // GET /health - service status
        let health = warp::path("health")
            .and(warp::path::end())
            .and(warp::get())
            .map(|| warp::reply::json(&ApiResponse::ok("Intent Pool Service is running".to_string())));

        // POST /intents - submit a signed intent
        let submit_pool = self.pool.clone();
        let submit = warp::path("intents")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::content_length_limit(MAX_BODY_BYTES))
            .and(warp::body::bytes())
            .and_then(move |body: Bytes| {
                let pool = submit_pool.clone();
                async move {
                    debug!("POST /intents - Received body: {}", String::from_utf8_lossy(&body));
                    intents::submit_intent_handler(body, pool).await
                }
            });

        // GET /intents - current pool snapshot
        let list_intents = warp::path("intents")
            .and(warp::path::end())
            .and(warp::get())
            .and(with_pool(self.pool.clone()))
            .and_then(intents::list_intents_handler);

        // POST /solve - clear the first compatible pair
        let solve = warp::path("solve")
            .and(warp::path::end())
            .and(warp::post())
            .and(with_solver(self.solver.clone()))
            .and_then(intents::solve_handler);

        // GET /matches - history, most recent first
        let list_matches = warp::path("matches")
            .and(warp::path::end())
            .and(warp::get())
            .and(with_history(self.history.clone()))
            .and_then(intents::list_matches_handler);

        health
            .or(submit)
            .or(list_intents)
            .or(solve)
            .or(list_matches)
            .with(create_cors_filter(&self.config.api.cors_origins))
            .recover(handle_rejection)
    }

    /// Public method for testing - exposes routes for integration tests
    pub fn test_routes(
        &self,
    ) -> impl Filter<Extract = impl warp::Reply, Error = std::convert::Infallible> + Clone {
        self.create_routes()
    }
}
