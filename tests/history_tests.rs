//! Unit tests for the match history

use std::sync::Arc;

use chrono::Utc;
use intent_pool::storage::MatchHistory;
use intent_pool::types::Match;

#[path = "mod.rs"]
mod test_helpers;
use test_helpers::{eth_for_usdc, usdc_for_eth};

/// Test an empty history
/// What is tested: New history lists nothing
/// Why: GET /matches must return an empty list before any solve
#[tokio::test]
async fn test_empty_history() {
    let history = MatchHistory::new();
    assert!(history.is_empty().await);
    assert!(history.list().await.is_empty());
}

/// Test listing order
/// What is tested: Appended matches are listed newest first
/// Why: Clients read the most recent clearing first
#[tokio::test]
async fn test_list_most_recent_first() {
    let history = MatchHistory::new();
    let first = history.record(usdc_for_eth(None), eth_for_usdc(None), 1.0).await;
    let second = Match {
        intent_a: usdc_for_eth(None),
        intent_b: eth_for_usdc(None),
        clearing_price: 2.0,
        created_at: Utc::now(),
    };
    history.append(second.clone()).await;

    assert_eq!(history.list().await, vec![second, first]);
    assert_eq!(history.len().await, 2);
}

/// Test record
/// What is tested: The recorded match carries the given pair and price
/// Why: Solvers hand the cleared pair to the history as is
#[tokio::test]
async fn test_record() {
    let history = MatchHistory::new();
    let a = usdc_for_eth(None);
    let b = eth_for_usdc(None);
    let before = Utc::now();

    let matched = history.record(a.clone(), b.clone(), 1000.5).await;
    assert_eq!(matched.intent_a, a);
    assert_eq!(matched.intent_b, b);
    assert_eq!(matched.clearing_price, 1000.5);
    assert!(matched.created_at >= before);
}

/// Test concurrent records
/// What is tested: Timestamps are non-increasing down the listing
/// Why: Recording stamps under the lock so order and time agree
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_records_are_ordered() {
    let history = Arc::new(MatchHistory::new());

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let history = history.clone();
            tokio::spawn(async move {
                history
                    .record(usdc_for_eth(None), eth_for_usdc(None), i as f64)
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let listed = history.list().await;
    assert_eq!(listed.len(), 32);
    for pair in listed.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
    }
}
