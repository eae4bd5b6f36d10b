//! Single-threaded depth-bounded AND/OR search with branch sub-sampling.

use gw_core::{BeliefState, SearchConfig};
use rand::Rng;

use crate::aggregate::{aggregate, VERY_LOW};
use crate::cache::ValueCache;
use crate::heuristic::Heuristic;
use crate::stats::SearchStats;

/// Probability of keeping each child of an outcome set with `n` members.
///
/// The expected number of kept children is `min(n, max_expand)`.
pub fn expand_probability(max_expand: f32, n: usize) -> f64 {
    if n == 0 {
        return 1.0;
    }
    (f64::from(max_expand) / n as f64).clamp(0.0, 1.0)
}

/// Recursive engine. One instance serves one decision; the RNG is borrowed from the caller so
/// a fixed seed reproduces the same sampling.
pub struct SequentialSearch<'a, R: Rng> {
    cfg: &'a SearchConfig,
    heuristic: &'a Heuristic,
    cache: &'a dyn ValueCache,
    rng: &'a mut R,
    stats: SearchStats,
}

impl<'a, R: Rng> SequentialSearch<'a, R> {
    pub fn new(
        cfg: &'a SearchConfig,
        heuristic: &'a Heuristic,
        cache: &'a dyn ValueCache,
        rng: &'a mut R,
    ) -> Self {
        Self {
            cfg,
            heuristic,
            cache,
            rng,
            stats: SearchStats::default(),
        }
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn into_stats(self) -> SearchStats {
        self.stats
    }

    fn eval<S: BeliefState>(&mut self, state: &S, reference: &S) -> f32 {
        self.stats.heuristic_evals += 1;
        self.heuristic.evaluate(state, reference)
    }

    /// Utility of `state` at `depth` below the search root.
    ///
    /// Returns [`VERY_LOW`] if every plan entry was pruned as a reversal.
    pub fn search<S: BeliefState>(&mut self, state: &S, depth: u32, reference: &S) -> f32 {
        if depth >= self.cfg.max_depth || state.is_dead() {
            return self.eval(state, reference);
        }

        let plan = state.expand();
        self.stats.expansions += 1;
        let facing = state.agent_position().facing;

        let mut best = VERY_LOW;
        for entry in plan.iter() {
            // Only unambiguous reversals are pruned.
            if self.cfg.prune_reversals
                && entry
                    .single_action()
                    .is_some_and(|a| a.is_reverse_of(facing))
            {
                self.stats.pruned_reversals += 1;
                continue;
            }

            let outcomes = entry.outcomes();
            let p = expand_probability(self.cfg.max_expand, outcomes.len());
            let mut values = Vec::with_capacity(outcomes.len());

            for child in outcomes.iter() {
                if !self.rng.gen_bool(p) {
                    self.stats.sampled_out += 1;
                    continue;
                }
                let v = if child.is_dead() {
                    self.eval(child, reference)
                } else {
                    let key = child.state_key();
                    match self.cache.get(key) {
                        Some(v) => {
                            self.stats.cache_hits += 1;
                            v
                        }
                        None => {
                            let v = self.search(child, depth + 1, reference);
                            self.cache.put(key, v);
                            self.stats.cache_writes += 1;
                            v
                        }
                    }
                };
                values.push(v);
            }

            let value = if values.is_empty() {
                self.stats.empty_fallbacks += 1;
                self.eval(state, reference)
            } else {
                aggregate(self.cfg.aggregation, &values)
            };
            if value > best {
                best = value;
            }
        }
        best
    }
}
