//! Search counters.

use std::sync::atomic::{AtomicU64, Ordering};

use gw_logging::SearchStatsV1;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchStats {
    /// `expand()` calls made by the engine (top-level expansion excluded).
    pub expansions: u64,
    pub heuristic_evals: u64,
    pub cache_hits: u64,
    pub cache_writes: u64,
    /// Plan entries skipped as unambiguous reversals.
    pub pruned_reversals: u64,
    /// Children dropped by the sampling coin.
    pub sampled_out: u64,
    /// Entries that fell back to the parent's heuristic because nothing was kept.
    pub empty_fallbacks: u64,
}

impl SearchStats {
    pub fn merge(&mut self, other: &SearchStats) {
        self.expansions += other.expansions;
        self.heuristic_evals += other.heuristic_evals;
        self.cache_hits += other.cache_hits;
        self.cache_writes += other.cache_writes;
        self.pruned_reversals += other.pruned_reversals;
        self.sampled_out += other.sampled_out;
        self.empty_fallbacks += other.empty_fallbacks;
    }

    pub fn to_event(&self, pellet_search_anomalies: u64) -> SearchStatsV1 {
        SearchStatsV1 {
            expansions: self.expansions,
            heuristic_evals: self.heuristic_evals,
            cache_hits: self.cache_hits,
            cache_writes: self.cache_writes,
            pruned_reversals: self.pruned_reversals,
            sampled_out: self.sampled_out,
            empty_fallbacks: self.empty_fallbacks,
            pellet_search_anomalies,
        }
    }
}

/// Lock-free counterpart used from rayon tasks.
#[derive(Debug, Default)]
pub(crate) struct AtomicStats {
    pub expansions: AtomicU64,
    pub heuristic_evals: AtomicU64,
    pub cache_hits: AtomicU64,
    pub cache_writes: AtomicU64,
    pub empty_fallbacks: AtomicU64,
}

impl AtomicStats {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SearchStats {
        SearchStats {
            expansions: self.expansions.load(Ordering::Relaxed),
            heuristic_evals: self.heuristic_evals.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_writes: self.cache_writes.load(Ordering::Relaxed),
            empty_fallbacks: self.empty_fallbacks.load(Ordering::Relaxed),
            ..SearchStats::default()
        }
    }
}
