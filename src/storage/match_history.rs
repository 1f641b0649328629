//! Match History Storage Module
//!
//! Append-only, in-memory log of cleared matches. Listing returns the most
//! recent match first.

use chrono::Utc;
use tokio::sync::{RwLock, RwLockWriteGuard};

use crate::types::{Intent, Match};

/// Append-only log of matches. Thread-safe via RwLock.
#[derive(Debug, Default)]
pub struct MatchHistory {
    matches: RwLock<Vec<Match>>,
}

/// Exclusive write access to the history.
///
/// Recording through a writer never awaits, so a caller that acquires the
/// writer before removing a pair from the pool can record the match in the
/// same poll as the removal.
pub struct HistoryWriter<'a> {
    matches: RwLockWriteGuard<'a, Vec<Match>>,
}

impl HistoryWriter<'_> {
    /// Create and append a match for a cleared pair.
    ///
    /// The timestamp is taken while the lock is held, so append order and
    /// `created_at` order agree even when several solvers record.
    ///
    /// # Returns
    ///
    /// The recorded match
    pub fn record(&mut self, intent_a: Intent, intent_b: Intent, clearing_price: f64) -> Match {
        let matched = Match {
            intent_a,
            intent_b,
            clearing_price,
            created_at: Utc::now(),
        };
        self.matches.push(matched.clone());
        matched
    }
}

impl MatchHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive write access.
    pub async fn writer(&self) -> HistoryWriter<'_> {
        HistoryWriter {
            matches: self.matches.write().await,
        }
    }

    /// Append a match to the end of the log.
    pub async fn append(&self, matched: Match) {
        self.matches.write().await.push(matched);
    }

    /// Create and append a match for a cleared pair.
    pub async fn record(&self, intent_a: Intent, intent_b: Intent, clearing_price: f64) -> Match {
        self.writer().await.record(intent_a, intent_b, clearing_price)
    }

    /// All matches, most recent first.
    pub async fn list(&self) -> Vec<Match> {
        let matches = self.matches.read().await;
        matches.iter().rev().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.matches.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
