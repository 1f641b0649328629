//! Intent and Solver API Handlers
//!
//! Handlers for submitting and listing intents, triggering the solver and
//! reading the match history.

use std::sync::Arc;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;

use crate::api::generic::ApiResponse;
use crate::solver::{MatchingSolver, SolveOutcome};
use crate::storage::{IntentPool, MatchHistory};
use crate::submission::{self, SubmissionError};
use crate::types::{Intent, Match};

/// Handler for POST /intents.
///
/// Parses, validates and verifies the body, then stores the intent.
///
/// # Returns
///
/// * `201 Created` - JSON response with the stored intent
/// * `400 Bad Request` - Validation, bad signature or signer mismatch
pub async fn submit_intent_handler(
    body: Bytes,
    pool: Arc<IntentPool>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result = match submission::parse_request(&body) {
        Ok(request) => submission::submit_intent(request, &pool).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(intent) => Ok(warp::reply::with_status(
            warp::reply::json(&ApiResponse::ok(intent)),
            StatusCode::CREATED,
        )),
        Err(e) => Ok(warp::reply::with_status(
            warp::reply::json(&ApiResponse::<Intent>::err(e.to_string())),
            status_for(&e),
        )),
    }
}

/// Handler for GET /intents. Returns the live pool in insertion order.
pub async fn list_intents_handler(
    pool: Arc<IntentPool>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let intents = pool.list().await;
    Ok(warp::reply::json(&ApiResponse::ok(intents)))
}

/// Handler for POST /solve.
///
/// Always 200: a missing match is reported as `{"status": "no-match"}`.
pub async fn solve_handler(
    solver: Arc<MatchingSolver>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let outcome: SolveOutcome = solver.solve().await;
    Ok(warp::reply::json(&ApiResponse::ok(outcome)))
}

/// Handler for GET /matches. Most recent match first.
pub async fn list_matches_handler(
    history: Arc<MatchHistory>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let matches: Vec<Match> = history.list().await;
    Ok(warp::reply::json(&ApiResponse::ok(matches)))
}

fn status_for(err: &SubmissionError) -> StatusCode {
    match err {
        SubmissionError::Validation(_)
        | SubmissionError::BadSignature(_)
        | SubmissionError::SignerMismatch { .. } => StatusCode::BAD_REQUEST,
    }
}
