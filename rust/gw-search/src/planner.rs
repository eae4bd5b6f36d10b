//! Move selection: one search per top-level plan entry, turn-back penalty, arg-max.

use std::time::{Duration, Instant};

use gw_core::{BeliefState, Config, Direction, SearchMode};
use gw_logging::{
    dbg_log, hash_config_bytes, now_ms, EntryUtilityV1, MoveEventV1, NdjsonError, NdjsonWriter,
    EVENT_SCHEMA_VERSION,
};
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;
use thiserror::Error;

use crate::aggregate::aggregate;
use crate::cache::{clears_before, MemoCache, ValueCache};
use crate::heuristic::Heuristic;
use crate::parallel::ParallelSearch;
use crate::sequential::SequentialSearch;
use crate::stats::SearchStats;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid config: {msg}")]
    InvalidConfig { msg: &'static str },
    #[error("failed to build search thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("event log: {0}")]
    EventLog(#[from] NdjsonError),
}

/// Utility of one top-level plan entry.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryUtility {
    pub actions: Vec<Direction>,
    pub outcomes: usize,
    /// Aggregate over the entry's outcomes.
    pub raw_utility: f32,
    /// `raw_utility` minus the turn-back penalty, if it applied.
    pub utility: f32,
}

/// Everything one decision computed.
#[derive(Debug, Clone)]
pub struct MoveReport {
    /// 0-based index of this decision.
    pub move_index: u64,
    pub action: Direction,
    /// True when the plan was empty and `default_action` was returned.
    pub default_used: bool,
    pub facing: Direction,
    pub entries: Vec<EntryUtility>,
    pub cache_cleared: bool,
    /// Cache size after the decision.
    pub cache_entries: usize,
    pub stats: SearchStats,
    /// Pellet-search anomalies hit during this decision.
    pub pellet_search_anomalies: u64,
    pub elapsed: Duration,
}

impl MoveReport {
    fn to_event(&self, mode: &SearchMode, config_hash: Option<&str>) -> MoveEventV1 {
        let mode = match mode {
            SearchMode::Sequential => "sequential",
            SearchMode::Parallel { .. } => "parallel",
        };
        MoveEventV1 {
            event: "move".to_string(),
            v: EVENT_SCHEMA_VERSION,
            ts_ms: now_ms(),
            move_index: self.move_index,
            mode: mode.to_string(),
            config_hash: config_hash.map(str::to_string),
            facing: self.facing.label().to_string(),
            chosen_action: self.action.label().to_string(),
            default_used: self.default_used,
            entries: self
                .entries
                .iter()
                .map(|e| EntryUtilityV1 {
                    actions: e.actions.iter().map(|a| a.label().to_string()).collect(),
                    outcomes: e.outcomes as u32,
                    raw_utility: e.raw_utility,
                    utility: e.utility,
                })
                .collect(),
            cache_cleared: self.cache_cleared,
            cache_entries: self.cache_entries as u64,
            elapsed_us: self.elapsed.as_micros() as u64,
            stats: self.stats.to_event(self.pellet_search_anomalies),
        }
    }
}

fn validate(cfg: &Config) -> Result<(), SearchError> {
    let s = &cfg.search;
    let h = &cfg.heuristic;
    if s.max_depth == 0 {
        return Err(SearchError::InvalidConfig {
            msg: "search.max_depth must be >= 1",
        });
    }
    if !(s.max_expand.is_finite() && s.max_expand > 0.0) {
        return Err(SearchError::InvalidConfig {
            msg: "search.max_expand must be finite and > 0",
        });
    }
    if s.cache_refresh_rate == 0 {
        return Err(SearchError::InvalidConfig {
            msg: "search.cache_refresh_rate must be >= 1",
        });
    }
    if !s.turn_back_penalty.is_finite() {
        return Err(SearchError::InvalidConfig {
            msg: "search.turn_back_penalty must be finite",
        });
    }
    let weights = [
        h.death_penalty,
        h.ghost_sight_reward,
        h.multi_ghost_sight_bonus,
        h.completion_bonus,
        h.progress_bonus,
        h.pellet_distance_weight,
        h.escape_route_bonus,
        h.super_pellet_weight,
        h.move_incentive,
    ];
    if weights.iter().any(|w| !w.is_finite()) {
        return Err(SearchError::InvalidConfig {
            msg: "heuristic weights must be finite",
        });
    }
    if h.pellet_search_radius == 0 {
        return Err(SearchError::InvalidConfig {
            msg: "heuristic.pellet_search_radius must be >= 1",
        });
    }
    if let SearchMode::Parallel { threads: Some(0) } = s.mode {
        return Err(SearchError::InvalidConfig {
            msg: "search.mode.threads must be >= 1",
        });
    }
    Ok(())
}

/// Stateful move selector: owns the memo cache, the sampling RNG, the thread pool (parallel
/// mode) and the decision counter.
pub struct Planner {
    cfg: Config,
    heuristic: Heuristic,
    cache: Box<dyn ValueCache>,
    rng: ChaCha8Rng,
    pool: Option<rayon::ThreadPool>,
    moves: u64,
    event_log: Option<NdjsonWriter>,
    config_hash: Option<String>,
}

impl Planner {
    pub fn new(cfg: Config) -> Result<Self, SearchError> {
        Self::with_cache(cfg, Box::new(MemoCache::new()))
    }

    /// Use a caller-supplied cache implementation.
    pub fn with_cache(cfg: Config, cache: Box<dyn ValueCache>) -> Result<Self, SearchError> {
        validate(&cfg)?;

        let pool = match cfg.search.mode {
            SearchMode::Sequential => None,
            SearchMode::Parallel { threads } => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads.unwrap_or(0) as usize)
                    .thread_name(|i| format!("gw-search-{i}"))
                    .build()?,
            ),
        };

        let event_log = match cfg.logging.event_log.as_deref() {
            Some(path) => Some(NdjsonWriter::open_append_with_flush(
                path,
                cfg.logging.flush_every_lines,
            )?),
            None => None,
        };
        let config_hash = serde_json::to_vec(&cfg)
            .ok()
            .map(|b| hash_config_bytes(&b));

        Ok(Self {
            heuristic: Heuristic::new(cfg.heuristic.clone()),
            rng: ChaCha8Rng::seed_from_u64(cfg.search.seed),
            cfg,
            cache,
            pool,
            moves: 0,
            event_log,
            config_hash,
        })
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn heuristic(&self) -> &Heuristic {
        &self.heuristic
    }

    /// Decisions made so far.
    pub fn moves(&self) -> u64 {
        self.moves
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn flush_event_log(&mut self) -> Result<(), SearchError> {
        if let Some(w) = self.event_log.as_mut() {
            w.flush()?;
        }
        Ok(())
    }

    /// Pick the next action for `state`. Never fails; event-log errors are dropped.
    pub fn choose_move<S: BeliefState + Send + Sync>(&mut self, state: &S) -> Direction {
        let report = self.decide(state);
        if let Err(e) = self.log_event(&report) {
            dbg_log(
                "planner::choose_move",
                "dropped decision event",
                serde_json::json!({ "move_index": report.move_index, "error": e.to_string() }),
            );
        }
        report.action
    }

    /// Like [`Planner::choose_move`], returning the full report and surfacing event-log errors.
    ///
    /// The decision counts even when the log write fails.
    pub fn choose_move_report<S: BeliefState + Send + Sync>(
        &mut self,
        state: &S,
    ) -> Result<MoveReport, SearchError> {
        let report = self.decide(state);
        self.log_event(&report)?;
        Ok(report)
    }

    fn log_event(&mut self, report: &MoveReport) -> Result<(), SearchError> {
        if let Some(w) = self.event_log.as_mut() {
            let ev = report.to_event(&self.cfg.search.mode, self.config_hash.as_deref());
            w.write_event(&ev)?;
        }
        Ok(())
    }

    fn decide<S: BeliefState + Send + Sync>(&mut self, state: &S) -> MoveReport {
        let t0 = Instant::now();
        let move_index = self.moves;
        let anomalies0 = self.heuristic.anomalies();

        let cache_cleared = clears_before(self.cfg.search.cache_refresh_rate, move_index);
        if cache_cleared {
            self.cache.clear();
        }

        let plan = state.expand();
        let facing = state.agent_position().facing;
        let mut stats = SearchStats::default();
        let mut entries = Vec::with_capacity(plan.len());

        for entry in plan.iter() {
            let values: Vec<f32> = entry
                .outcomes()
                .iter()
                .map(|outcome| {
                    let (v, s) = self.evaluate_outcome(outcome);
                    stats.merge(&s);
                    v
                })
                .collect();
            let raw = aggregate(self.cfg.search.aggregation, &values);
            let utility = if entry.primary_action().is_reverse_of(facing) {
                raw - self.cfg.search.turn_back_penalty
            } else {
                raw
            };
            entries.push(EntryUtility {
                actions: entry.actions().to_vec(),
                outcomes: entry.outcomes().len(),
                raw_utility: raw,
                utility,
            });
        }

        let mut best: Option<(usize, f32)> = None;
        for (i, e) in entries.iter().enumerate() {
            match best {
                Some((_, b)) if e.utility <= b => {}
                _ => best = Some((i, e.utility)),
            }
        }
        let (action, default_used) = match best {
            Some((i, _)) => (entries[i].actions[0], false),
            None => (self.cfg.search.default_action, true),
        };

        self.moves += 1;
        MoveReport {
            move_index,
            action,
            default_used,
            facing,
            entries,
            cache_cleared,
            cache_entries: self.cache.len(),
            stats,
            pellet_search_anomalies: self.heuristic.anomalies() - anomalies0,
            elapsed: t0.elapsed(),
        }
    }

    /// Each top-level outcome is searched from depth 0 as its own reference.
    fn evaluate_outcome<S: BeliefState + Send + Sync>(&mut self, outcome: &S) -> (f32, SearchStats) {
        match &self.pool {
            None => {
                let mut engine = SequentialSearch::new(
                    &self.cfg.search,
                    &self.heuristic,
                    &*self.cache,
                    &mut self.rng,
                );
                let v = engine.search(outcome, 0, outcome);
                (v, engine.into_stats())
            }
            Some(pool) => {
                let engine =
                    ParallelSearch::new(&self.cfg.search, &self.heuristic, &*self.cache);
                let v = pool.install(|| engine.search(outcome, 0, outcome));
                (v, engine.stats())
            }
        }
    }
}
