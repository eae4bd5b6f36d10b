//! Static evaluation of one belief state relative to the state its search was rooted at.

use std::sync::atomic::{AtomicU64, Ordering};

use gw_core::{BeliefState, HeuristicConfig};
use gw_logging::dbg_log;

/// Weighted-feature evaluator.
///
/// Deterministic in its inputs. The only side effect is the pellet-search anomaly counter.
pub struct Heuristic {
    cfg: HeuristicConfig,
    anomalies: AtomicU64,
}

impl Heuristic {
    pub fn new(cfg: HeuristicConfig) -> Self {
        Self {
            cfg,
            anomalies: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &HeuristicConfig {
        &self.cfg
    }

    /// Times the nearest-pellet search came back empty although pellets remained.
    pub fn anomalies(&self) -> u64 {
        self.anomalies.load(Ordering::Relaxed)
    }

    /// Score `state`; `reference` is the belief state the current search branch started from.
    pub fn evaluate<S: BeliefState>(&self, state: &S, reference: &S) -> f32 {
        let c = &self.cfg;
        if state.is_dead() {
            return state.score() as f32 - c.death_penalty;
        }

        let mut h = state.score() as f32;

        // Certain ghosts are cheaper to plan around.
        let seen = state.ghosts_in_sight();
        h += seen as f32 * c.ghost_sight_reward;
        if seen >= 2 {
            h += c.multi_ghost_sight_bonus;
        }

        let pos = state.agent_position();
        if c.escape_route_bonus != 0.0 && state.grid().open_neighbours(pos.x, pos.y) >= 3 {
            h += c.escape_route_bonus;
        }
        h += c.super_pellet_weight * state.super_pellets_remaining() as f32;
        if c.move_incentive != 0.0 {
            h += c.move_incentive * pos.manhattan(&reference.agent_position()) as f32;
        }

        let pellets = state.pellets_remaining();
        if pellets == 0 {
            h += c.completion_bonus;
        } else if pellets < reference.pellets_remaining() {
            h += c.progress_bonus;
        } else {
            h -= c.pellet_distance_weight * self.pellet_distance(state) as f32;
        }
        h
    }

    /// Manhattan distance to the nearest pellet, or `2 × radius` if none is within the cap.
    pub fn pellet_distance<S: BeliefState>(&self, state: &S) -> u32 {
        let radius = self.cfg.pellet_search_radius;
        let pos = state.agent_position();
        match state.nearest_pellet_distance(radius) {
            Some(d) => d,
            None => {
                let n = self.anomalies.fetch_add(1, Ordering::Relaxed) + 1;
                dbg_log(
                    "heuristic::pellet_distance",
                    "no pellet within search radius",
                    serde_json::json!({
                        "x": pos.x,
                        "y": pos.y,
                        "radius": radius,
                        "pellets_remaining": state.pellets_remaining(),
                        "anomalies": n,
                    }),
                );
                2 * radius
            }
        }
    }
}
