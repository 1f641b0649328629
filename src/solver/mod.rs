//! Matching Solver Module
//!
//! Scans the intent pool for the first compatible pair and clears it.
//!
//! ## Policy
//!
//! First-fit: pairs `(i, j)`, `i < j`, are visited in pool order and the
//! first compatible one is cleared. There is no best-price search, no partial
//! fill and no price improvement. The clearing price is the mean of both
//! intents' prices.
//!
//! ## Concurrency
//!
//! The scan runs on a snapshot. The chosen pair is removed from the live pool
//! with [`IntentPool::remove_pair`]; if another solver got there first the
//! removal fails as stale and the scan continues on a fresh snapshot. The
//! history writer is held across the removal, so the pair is never missing
//! from both the pool and the history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use crate::storage::{IntentPool, MatchHistory, PoolEntry, PoolError};
use crate::types::{Intent, Match};

// ============================================================================
// COMPATIBILITY
// ============================================================================

/// Why two intents cannot be matched.
#[derive(Debug, Clone, PartialEq)]
pub enum Incompatibility {
    /// Give/get assets do not cross on symbol and chain
    AssetMismatch,
    /// An intent's price is undefined (non-positive `amount_min`)
    UndefinedPrice,
    /// An intent's price exceeds its own price limit
    PriceLimitExceeded { price: f64, limit: f64 },
    /// An intent's deadline is not after the current instant
    Expired,
}

/// Checks whether `a` and `b` can be matched at `now`.
///
/// # Returns
///
/// * `Ok(f64)` - The clearing price `(price_a + price_b) / 2`
/// * `Err(Incompatibility)` - The first rule the pair violates
pub fn check_compatibility(a: &Intent, b: &Intent, now: DateTime<Utc>) -> Result<f64, Incompatibility> {
    // 1. A gives exactly what B wants and vice versa
    if a.give.asset != b.get.asset || a.get.asset != b.give.asset {
        return Err(Incompatibility::AssetMismatch);
    }

    // 2. Each price within its own limit
    let price_a = a.price().ok_or(Incompatibility::UndefinedPrice)?;
    let price_b = b.price().ok_or(Incompatibility::UndefinedPrice)?;
    for (price, limit) in [(price_a, a.price_limit()), (price_b, b.price_limit())] {
        if let Some(limit) = limit {
            if price > limit {
                return Err(Incompatibility::PriceLimitExceeded { price, limit });
            }
        }
    }

    // 3. Neither past its deadline
    if !a.is_live_at(now) || !b.is_live_at(now) {
        return Err(Incompatibility::Expired);
    }

    Ok((price_a + price_b) / 2.0)
}

/// Whether `a` and `b` can be matched at `now`.
pub fn compatible(a: &Intent, b: &Intent, now: DateTime<Utc>) -> bool {
    check_compatibility(a, b, now).is_ok()
}

// ============================================================================
// SOLVER
// ============================================================================

/// Result of a solve attempt. `NoMatch` is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum SolveOutcome {
    Matched(Match),
    NoMatch,
}

impl SolveOutcome {
    pub fn into_match(self) -> Option<Match> {
        match self {
            SolveOutcome::Matched(matched) => Some(matched),
            SolveOutcome::NoMatch => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, SolveOutcome::Matched(_))
    }
}

/// First-fit pairwise solver over a shared pool.
#[derive(Debug, Clone)]
pub struct MatchingSolver {
    pool: Arc<IntentPool>,
    history: Arc<MatchHistory>,
}

impl MatchingSolver {
    pub fn new(pool: Arc<IntentPool>, history: Arc<MatchHistory>) -> Self {
        Self { pool, history }
    }

    pub fn pool(&self) -> &Arc<IntentPool> {
        &self.pool
    }

    pub fn history(&self) -> &Arc<MatchHistory> {
        &self.history
    }

    /// Clears the first compatible pair in the pool, checking deadlines
    /// against the current time.
    pub async fn solve(&self) -> SolveOutcome {
        self.solve_at(Utc::now()).await
    }

    /// Clears the first compatible pair in the pool, checking deadlines
    /// against `now`.
    ///
    /// On success both intents are gone from the pool and the match is the
    /// newest history entry.
    pub async fn solve_at(&self, now: DateTime<Utc>) -> SolveOutcome {
        let mut snapshot = self.pool.snapshot().await;

        'scan: loop {
            let Some((a, b, clearing_price)) = first_compatible_pair(&snapshot, now) else {
                return SolveOutcome::NoMatch;
            };

            // Lock order: history, then pool. Once the pair is removed the
            // match is recorded without another await, so a dropped solve
            // either commits both steps or neither.
            let mut writer = self.history.writer().await;
            match self.pool.remove_pair(a.index, b.index).await {
                Ok((intent_a, intent_b)) => {
                    let matched = writer.record(intent_a, intent_b, clearing_price);
                    drop(writer);
                    info!(
                        "Matched intent {} with {} at clearing price {}",
                        matched.intent_a.id, matched.intent_b.id, clearing_price
                    );
                    return SolveOutcome::Matched(matched);
                }
                Err(PoolError::StaleIndex(index)) => {
                    drop(writer);
                    debug!("Slot {} taken by a concurrent solve, rescanning", index);
                    snapshot = self.pool.snapshot().await;
                    continue 'scan;
                }
                Err(e @ PoolError::InvalidPair(..)) => {
                    // Snapshot entries are strictly increasing, so this is unreachable
                    debug!("Skipping pair: {}", e);
                    return SolveOutcome::NoMatch;
                }
            }
        }
    }

    /// Clears compatible pairs until none are left.
    ///
    /// # Returns
    ///
    /// The matches made, oldest first
    pub async fn solve_all(&self) -> Vec<Match> {
        let mut cleared = Vec::new();
        while let SolveOutcome::Matched(matched) = self.solve().await {
            cleared.push(matched);
        }
        cleared
    }

    /// Spawns a background task that drains the pool every `interval`.
    pub fn spawn_auto_solve(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        info!("Starting background solver every {:?}", interval);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let cleared = self.solve_all().await;
                if !cleared.is_empty() {
                    info!("Background solver cleared {} match(es)", cleared.len());
                }
            }
        })
    }
}

/// First pair in snapshot order that passes [`check_compatibility`].
fn first_compatible_pair(
    snapshot: &[PoolEntry],
    now: DateTime<Utc>,
) -> Option<(&PoolEntry, &PoolEntry, f64)> {
    for (pos, a) in snapshot.iter().enumerate() {
        for b in &snapshot[pos + 1..] {
            match check_compatibility(&a.intent, &b.intent, now) {
                Ok(clearing_price) => return Some((a, b, clearing_price)),
                Err(reason) => trace!(
                    "Intents {} and {} incompatible: {:?}",
                    a.intent.id,
                    b.intent.id,
                    reason
                ),
            }
        }
    }
    None
}
