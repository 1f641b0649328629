//! Intent Pool Storage Module
//!
//! In-memory pool of live (unmatched) intents. Intents are kept in a slot
//! arena: every admitted intent gets a slot index that stays valid until the
//! intent is removed and is never handed out again. Matching removes two
//! slots at once under a single write lock, so no observer can see one half
//! of a cleared pair.

use std::collections::VecDeque;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::types::Intent;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Stable position of an intent in the pool.
pub type SlotIndex = usize;

/// An intent together with the slot it occupies.
#[derive(Debug, Clone)]
pub struct PoolEntry {
    pub index: SlotIndex,
    pub intent: Intent,
}

/// Errors from pairwise removal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    /// The slot no longer holds an intent (already matched)
    #[error("slot {0} is stale")]
    StaleIndex(SlotIndex),
    /// Removal requires two distinct slots given in ascending order
    #[error("invalid slot pair ({0}, {1}): first index must be lower")]
    InvalidPair(SlotIndex, SlotIndex),
}

/// Slot arena. `slots[k]` holds slot index `base + k`.
#[derive(Debug, Default)]
struct SlotArena {
    /// Slot index of the first element of `slots`
    base: SlotIndex,
    slots: VecDeque<Option<Intent>>,
    /// Number of occupied slots
    live: usize,
}

impl SlotArena {
    fn position(&self, index: SlotIndex) -> Option<usize> {
        index
            .checked_sub(self.base)
            .filter(|pos| *pos < self.slots.len())
    }

    fn is_occupied(&self, index: SlotIndex) -> bool {
        self.position(index)
            .map_or(false, |pos| self.slots[pos].is_some())
    }

    fn take(&mut self, index: SlotIndex) -> Option<Intent> {
        let pos = self.position(index)?;
        let intent = self.slots[pos].take();
        if intent.is_some() {
            self.live -= 1;
        }
        intent
    }

    /// Drops vacated slots from the front. Indices of remaining slots are
    /// unchanged.
    fn reclaim_front(&mut self) {
        while matches!(self.slots.front(), Some(None)) {
            self.slots.pop_front();
            self.base += 1;
        }
    }

    fn entries(&self) -> impl Iterator<Item = (SlotIndex, &Intent)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(move |(pos, slot)| slot.as_ref().map(|intent| (self.base + pos, intent)))
    }
}

// ============================================================================
// STORAGE IMPLEMENTATION
// ============================================================================

/// Process-wide pool of admitted intents.
///
/// Thread-safe via RwLock. Created once at startup and shared by handle.
#[derive(Debug, Default)]
pub struct IntentPool {
    arena: RwLock<SlotArena>,
}

impl IntentPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an intent.
    ///
    /// Never rejects: the intent was validated on admission.
    ///
    /// # Returns
    ///
    /// The stored intent
    pub async fn add(&self, intent: Intent) -> Intent {
        let mut arena = self.arena.write().await;
        arena.slots.push_back(Some(intent.clone()));
        arena.live += 1;
        intent
    }

    /// Snapshot of all live intents in insertion order.
    pub async fn list(&self) -> Vec<Intent> {
        let arena = self.arena.read().await;
        arena.entries().map(|(_, intent)| intent.clone()).collect()
    }

    /// Snapshot of all live intents with their slot indices, in insertion
    /// order.
    pub async fn snapshot(&self) -> Vec<PoolEntry> {
        let arena = self.arena.read().await;
        arena
            .entries()
            .map(|(index, intent)| PoolEntry {
                index,
                intent: intent.clone(),
            })
            .collect()
    }

    /// Atomically remove the intents in slots `i` and `j`.
    ///
    /// Both slots are checked before either is cleared, so a stale index
    /// leaves the pool untouched.
    ///
    /// # Arguments
    ///
    /// * `i` - Lower slot index
    /// * `j` - Higher slot index
    ///
    /// # Returns
    ///
    /// * `Ok((Intent, Intent))` - The removed intents, in slot order
    /// * `Err(PoolError::StaleIndex)` - A slot was already vacated
    /// * `Err(PoolError::InvalidPair)` - `i >= j`
    pub async fn remove_pair(&self, i: SlotIndex, j: SlotIndex) -> Result<(Intent, Intent), PoolError> {
        if i >= j {
            return Err(PoolError::InvalidPair(i, j));
        }

        let mut arena = self.arena.write().await;
        for index in [i, j] {
            if !arena.is_occupied(index) {
                return Err(PoolError::StaleIndex(index));
            }
        }

        let first = arena.take(i).ok_or(PoolError::StaleIndex(i))?;
        let second = arena.take(j).ok_or(PoolError::StaleIndex(j))?;
        arena.reclaim_front();

        Ok((first, second))
    }

    /// Number of live intents.
    pub async fn len(&self) -> usize {
        self.arena.read().await.live
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
