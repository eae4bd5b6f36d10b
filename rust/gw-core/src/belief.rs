//! The belief-state contract consumed by the search engines.

use crate::action::Position;
use crate::grid::{nearest_pellet, Grid};
use crate::plan::Plan;

/// Canonical identity of a belief state.
///
/// Independent of Rust's `Hash` randomness so cache behaviour is reproducible across runs.
pub type StateKey = u128;

/// A snapshot of the agent's uncertainty about the world.
///
/// Implementations are immutable from the engine's point of view: the engine only reads and
/// expands them. `state_key` must be canonical, i.e. two semantically identical states produce
/// the same key and different states produce different keys (up to hash collisions).
pub trait BeliefState: Sized {
    fn score(&self) -> i32;

    /// Zero means the agent is dead.
    fn lives(&self) -> u32;

    fn pellets_remaining(&self) -> u32;

    fn super_pellets_remaining(&self) -> u32;

    fn agent_position(&self) -> Position;

    fn grid(&self) -> &Grid;

    fn ghost_count(&self) -> usize;

    /// Candidate cells for ghost `i`. A single candidate means the ghost is in sight.
    fn possible_ghost_positions(&self, i: usize) -> &[Position];

    /// Successor belief states per action.
    fn expand(&self) -> Plan<Self>;

    fn state_key(&self) -> StateKey;

    fn is_dead(&self) -> bool {
        self.lives() == 0
    }

    fn ghosts_in_sight(&self) -> u32 {
        (0..self.ghost_count())
            .filter(|&i| self.possible_ghost_positions(i).len() == 1)
            .count() as u32
    }

    /// Manhattan distance to the nearest pellet within `max_radius`, if any.
    ///
    /// The default searches `grid()` ring by ring around the agent.
    fn nearest_pellet_distance(&self, max_radius: u32) -> Option<u32> {
        nearest_pellet(self.grid(), self.agent_position(), max_radius)
    }
}
