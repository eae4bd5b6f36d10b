//! Fork-join AND/OR search over rayon's work-stealing pool.
//!
//! Same recursion as [`crate::sequential`], split into OR tasks (pick the best action) and AND
//! tasks (aggregate the outcomes of one action). All children of a task are joined before it
//! reduces, and joined values are collected in plan order. Horizon states are evaluated, never
//! cached or looked up, so the result does not depend on scheduling unless one state is expanded
//! at two different depths. No sub-sampling and no reversal pruning: every branch is expanded.

use gw_core::{BeliefState, Outcomes, SearchConfig};
use rayon::prelude::*;

use crate::aggregate::{aggregate, max_or_very_low};
use crate::cache::ValueCache;
use crate::heuristic::Heuristic;
use crate::stats::{AtomicStats, SearchStats};

/// A unit of work in the fork-join recursion.
pub enum SearchTask<'s, S> {
    /// Decision node: maximize over the plan entries of `state`.
    Or { state: &'s S, depth: u32 },
    /// Chance node: aggregate over `outcomes`, the result of one action taken in `parent`.
    And {
        parent: &'s S,
        outcomes: &'s Outcomes<S>,
        depth: u32,
    },
}

pub struct ParallelSearch<'a> {
    cfg: &'a SearchConfig,
    heuristic: &'a Heuristic,
    cache: &'a dyn ValueCache,
    stats: AtomicStats,
}

impl<'a> ParallelSearch<'a> {
    pub fn new(cfg: &'a SearchConfig, heuristic: &'a Heuristic, cache: &'a dyn ValueCache) -> Self {
        Self {
            cfg,
            heuristic,
            cache,
            stats: AtomicStats::default(),
        }
    }

    pub fn stats(&self) -> SearchStats {
        self.stats.snapshot()
    }

    /// Utility of `state` at `depth` below the search root.
    ///
    /// Call inside `ThreadPool::install` to pick the pool; otherwise rayon's global pool runs it.
    pub fn search<S: BeliefState + Sync>(&self, state: &S, depth: u32, reference: &S) -> f32 {
        self.run(SearchTask::Or { state, depth }, reference)
    }

    pub fn run<S: BeliefState + Sync>(&self, task: SearchTask<'_, S>, reference: &S) -> f32 {
        match task {
            SearchTask::Or { state, depth } => self.or_task(state, depth, reference),
            SearchTask::And {
                parent,
                outcomes,
                depth,
            } => self.and_task(parent, outcomes, depth, reference),
        }
    }

    fn eval<S: BeliefState>(&self, state: &S, reference: &S) -> f32 {
        AtomicStats::bump(&self.stats.heuristic_evals);
        self.heuristic.evaluate(state, reference)
    }

    fn or_task<S: BeliefState + Sync>(&self, state: &S, depth: u32, reference: &S) -> f32 {
        if state.is_dead() {
            return self.eval(state, reference);
        }
        let key = state.state_key();
        if depth >= self.cfg.max_depth {
            return self.eval(state, reference);
        }
        if let Some(v) = self.cache.get(key) {
            AtomicStats::bump(&self.stats.cache_hits);
            return v;
        }

        let plan = state.expand();
        AtomicStats::bump(&self.stats.expansions);

        let values: Vec<f32> = plan
            .entries()
            .par_iter()
            .map(|entry| {
                self.run(
                    SearchTask::And {
                        parent: state,
                        outcomes: entry.outcomes(),
                        depth,
                    },
                    reference,
                )
            })
            .collect();

        let best = max_or_very_low(&values);
        self.put(key, best);
        best
    }

    fn and_task<S: BeliefState + Sync>(
        &self,
        parent: &S,
        outcomes: &Outcomes<S>,
        depth: u32,
        reference: &S,
    ) -> f32 {
        if outcomes.is_empty() {
            AtomicStats::bump(&self.stats.empty_fallbacks);
            return self.eval(parent, reference);
        }
        let values: Vec<f32> = outcomes
            .states()
            .par_iter()
            .map(|child| {
                self.run(
                    SearchTask::Or {
                        state: child,
                        depth: depth + 1,
                    },
                    reference,
                )
            })
            .collect();
        aggregate(self.cfg.aggregation, &values)
    }

    fn put(&self, key: gw_core::StateKey, value: f32) {
        self.cache.put(key, value);
        AtomicStats::bump(&self.stats.cache_writes);
    }
}
