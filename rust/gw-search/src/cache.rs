//! Memoization cache shared by both engines.

use std::sync::{Mutex, MutexGuard, PoisonError};

use gw_core::StateKey;
use rustc_hash::FxHashMap;

/// Belief-state key → backed-up utility.
///
/// Each call is atomic with respect to the others. Concurrent writers racing on one key may
/// both compute it; the last write wins and readers never see a torn value. Entries are only
/// ever removed by a full [`ValueCache::clear`].
pub trait ValueCache: Send + Sync {
    fn get(&self, key: StateKey) -> Option<f32>;
    fn put(&self, key: StateKey, value: f32);
    fn clear(&self);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, key: StateKey) -> bool {
        self.get(key).is_some()
    }
}

/// Mutex-guarded hash map.
#[derive(Default)]
pub struct MemoCache {
    map: Mutex<FxHashMap<StateKey, f32>>,
}

impl MemoCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FxHashMap<StateKey, f32>> {
        // A panicking holder can only have been between whole-value inserts.
        self.map.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ValueCache for MemoCache {
    fn get(&self, key: StateKey) -> Option<f32> {
        self.lock().get(&key).copied()
    }

    fn put(&self, key: StateKey, value: f32) {
        self.lock().insert(key, value);
    }

    fn clear(&self) {
        self.lock().clear();
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

/// Whether decision number `move_index` (0-based) starts with a cleared cache.
///
/// `refresh_rate == 1` clears before every decision; `R` clears on decisions `0, R, 2R, ...`.
pub fn clears_before(refresh_rate: u32, move_index: u64) -> bool {
    let r = u64::from(refresh_rate.max(1));
    move_index % r == 0
}
