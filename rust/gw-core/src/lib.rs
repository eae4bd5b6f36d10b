//! gw-core: belief-state contract, plan model, grid, configuration and a reference maze world.

pub mod action;
pub mod belief;
pub mod config;
pub mod grid;
pub mod maze;
pub mod plan;

pub use action::{Direction, Position, NUM_DIRECTIONS};
pub use belief::{BeliefState, StateKey};
pub use config::{
    Aggregation, Config, ConfigError, HeuristicConfig, LoggingConfig, SearchConfig, SearchMode,
};
pub use grid::{nearest_pellet, Cell, Grid, DEFAULT_PELLET_SEARCH_RADIUS};
pub use maze::{MazeBelief, MazeError};
pub use plan::{Outcomes, Plan, PlanEntry};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
