//! Belief-state AND/OR move search.
//!
//! The design uses:
//! - The `BeliefState` contract from gw-core (expansion into `Plan`/`Outcomes`, canonical keys)
//! - A weighted-feature heuristic at the horizon
//! - Mean or min aggregation over uncertain outcomes, max over actions
//! - A shared memo cache, cleared on a fixed decision cadence
//! - Two engines: seeded sequential sub-sampling, or fork-join on a rayon pool

pub mod aggregate;
pub mod cache;
pub mod heuristic;
pub mod parallel;
pub mod planner;
pub mod sequential;
pub mod stats;

pub use aggregate::{aggregate, VERY_LOW};
pub use cache::{clears_before, MemoCache, ValueCache};
pub use heuristic::Heuristic;
pub use parallel::{ParallelSearch, SearchTask};
pub use planner::{EntryUtility, MoveReport, Planner, SearchError};
pub use sequential::{expand_probability, SequentialSearch};
pub use stats::SearchStats;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");


#[cfg(test)]
mod testkit;

#[cfg(test)]
mod parallel_tests;
