//! Configuration schema for the move planner.
//!
//! Every structural constant of the search (horizon, aggregation, penalties, sampling target,
//! cache cadence, heuristic weights) is a named option here. The same YAML file drives tests,
//! benches and hosts.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::action::Direction;
use crate::grid::DEFAULT_PELLET_SEARCH_RADIUS;

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Tree-search settings.
    #[serde(default)]
    pub search: SearchConfig,
    /// Heuristic feature weights.
    #[serde(default)]
    pub heuristic: HeuristicConfig,
    /// Decision event logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How sibling outcome values (one AND-branch) collapse into one number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Expected utility under uncertainty.
    #[default]
    Mean,
    /// Worst case.
    Min,
}

/// Which engine evaluates the belief states under each top-level action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchMode {
    /// Single-threaded recursion with sampling and reversal pruning.
    #[default]
    Sequential,
    /// Fork-join over a work-stealing pool. `threads: None` uses rayon's default.
    Parallel {
        #[serde(default)]
        threads: Option<u32>,
    },
}

/// Tree-search configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Search horizon (plies below each top-level outcome).
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
    /// AND-layer aggregation; the OR layer always maximizes.
    #[serde(default)]
    pub aggregation: Aggregation,
    /// Deducted from a top-level action that reverses the current heading.
    #[serde(default = "default_turn_back_penalty")]
    pub turn_back_penalty: f32,
    /// Expected number of children kept per outcome set.
    #[serde(default = "default_max_expand")]
    pub max_expand: f32,
    /// Clear the memo cache every N decisions (1 = before every decision).
    ///
    /// Large values let stale entries hide ghost movement the agent should react to.
    #[serde(default = "default_cache_refresh_rate")]
    pub cache_refresh_rate: u32,
    /// Skip unambiguous reversals inside the recursive search.
    #[serde(default = "default_true")]
    pub prune_reversals: bool,
    /// Returned when the current state offers no action at all.
    #[serde(default = "default_action")]
    pub default_action: Direction,
    /// Seed of the branch-sampling RNG.
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub mode: SearchMode,
}

fn default_max_depth() -> u32 {
    4
}

fn default_turn_back_penalty() -> f32 {
    150.0
}

fn default_max_expand() -> f32 {
    10.0
}

fn default_cache_refresh_rate() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_action() -> Direction {
    Direction::Left
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            aggregation: Aggregation::default(),
            turn_back_penalty: default_turn_back_penalty(),
            max_expand: default_max_expand(),
            cache_refresh_rate: default_cache_refresh_rate(),
            prune_reversals: true,
            default_action: default_action(),
            seed: 0,
            mode: SearchMode::default(),
        }
    }
}

/// Heuristic feature weights. A weight of `0` disables its term.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HeuristicConfig {
    /// Subtracted from the score of a dead state.
    #[serde(default = "default_death_penalty")]
    pub death_penalty: f32,
    /// Reward per ghost whose position is certain.
    #[serde(default = "default_ghost_sight_reward")]
    pub ghost_sight_reward: f32,
    /// Extra reward when two or more ghosts are certain at once.
    #[serde(default = "default_multi_ghost_sight_bonus")]
    pub multi_ghost_sight_bonus: f32,
    /// Reward when no pellet remains.
    #[serde(default = "default_completion_bonus")]
    pub completion_bonus: f32,
    /// Reward when a pellet was eaten since the reference state.
    #[serde(default = "default_progress_bonus")]
    pub progress_bonus: f32,
    /// Penalty per cell of distance to the nearest pellet.
    #[serde(default = "default_pellet_distance_weight")]
    pub pellet_distance_weight: f32,
    /// Cap of the nearest-pellet ring search.
    #[serde(default = "default_pellet_search_radius")]
    pub pellet_search_radius: u32,
    /// Reward for standing on a junction (3+ open neighbours).
    #[serde(default = "default_escape_route_bonus")]
    pub escape_route_bonus: f32,
    /// Reward per super pellet still on the board.
    #[serde(default = "default_super_pellet_weight")]
    pub super_pellet_weight: f32,
    /// Reward per cell travelled away from the reference position.
    #[serde(default = "default_move_incentive")]
    pub move_incentive: f32,
}

fn default_death_penalty() -> f32 {
    1000.0
}

fn default_ghost_sight_reward() -> f32 {
    30.0
}

fn default_multi_ghost_sight_bonus() -> f32 {
    20.0
}

fn default_completion_bonus() -> f32 {
    1000.0
}

fn default_progress_bonus() -> f32 {
    10.0
}

fn default_pellet_distance_weight() -> f32 {
    10.0
}

fn default_pellet_search_radius() -> u32 {
    DEFAULT_PELLET_SEARCH_RADIUS
}

fn default_escape_route_bonus() -> f32 {
    5.0
}

fn default_super_pellet_weight() -> f32 {
    5.0
}

fn default_move_incentive() -> f32 {
    1.0
}

impl HeuristicConfig {
    /// Only score, death, sight, completion, progress and distance terms.
    pub fn core_terms_only() -> Self {
        Self {
            escape_route_bonus: 0.0,
            super_pellet_weight: 0.0,
            move_incentive: 0.0,
            multi_ghost_sight_bonus: 0.0,
            ..Self::default()
        }
    }
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            death_penalty: default_death_penalty(),
            ghost_sight_reward: default_ghost_sight_reward(),
            multi_ghost_sight_bonus: default_multi_ghost_sight_bonus(),
            completion_bonus: default_completion_bonus(),
            progress_bonus: default_progress_bonus(),
            pellet_distance_weight: default_pellet_distance_weight(),
            pellet_search_radius: default_pellet_search_radius(),
            escape_route_bonus: default_escape_route_bonus(),
            super_pellet_weight: default_super_pellet_weight(),
            move_incentive: default_move_incentive(),
        }
    }
}

/// Decision event log settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// NDJSON file receiving one event per decision. Disabled when `None`.
    #[serde(default)]
    pub event_log: Option<String>,
    /// Flush every N lines (0 = only on drop / explicit flush).
    #[serde(default)]
    pub flush_every_lines: u64,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_default_yaml() {
        // Load the actual config file from the repo
        let config =
            Config::load("../../configs/default.yaml").expect("Failed to load configs/default.yaml");

        assert_eq!(config.search.max_depth, 4);
        assert_eq!(config.search.aggregation, Aggregation::Mean);
        assert_eq!(config.search.turn_back_penalty, 150.0);
        assert_eq!(config.search.max_expand, 10.0);
        assert_eq!(config.search.cache_refresh_rate, 1);
        assert!(config.search.prune_reversals);
        assert_eq!(config.search.default_action, Direction::Left);
        assert_eq!(config.search.mode, SearchMode::Sequential);
        assert_eq!(config.heuristic.death_penalty, 1000.0);
        assert_eq!(config.heuristic.ghost_sight_reward, 30.0);
        assert_eq!(config.heuristic.pellet_search_radius, 25);
        assert_eq!(config.logging.event_log, None);
    }

    #[test]
    fn test_parse_yaml_string() {
        let yaml = r#"
search:
  max_depth: 6
  aggregation: min
  turn_back_penalty: 50
  default_action: UP
  mode:
    kind: parallel
    threads: 4

heuristic:
  death_penalty: 500
  escape_route_bonus: 0
"#;

        let config = Config::from_yaml(yaml).expect("Failed to parse YAML");
        assert_eq!(config.search.max_depth, 6);
        assert_eq!(config.search.aggregation, Aggregation::Min);
        assert_eq!(config.search.turn_back_penalty, 50.0);
        assert_eq!(config.search.default_action, Direction::Up);
        assert_eq!(config.search.mode, SearchMode::Parallel { threads: Some(4) });
        assert_eq!(config.heuristic.death_penalty, 500.0);
        assert_eq!(config.heuristic.escape_route_bonus, 0.0);
        // Check defaults are applied
        assert_eq!(config.search.max_expand, 10.0);
        assert_eq!(config.search.cache_refresh_rate, 1);
        assert_eq!(config.heuristic.completion_bonus, 1000.0);
        assert_eq!(config.heuristic.move_incentive, 1.0);
    }

    #[test]
    fn test_empty_yaml_is_all_defaults() {
        let config = Config::from_yaml("{}").expect("Failed to parse YAML");
        assert_eq!(config.search.max_depth, SearchConfig::default().max_depth);
        assert_eq!(config.search.mode, SearchMode::Sequential);
        assert_eq!(config.logging.flush_every_lines, 0);
    }

    #[test]
    fn test_parallel_mode_without_threads() {
        let config = Config::from_yaml("search:\n  mode: { kind: parallel }\n").unwrap();
        assert_eq!(config.search.mode, SearchMode::Parallel { threads: None });
    }

    #[test]
    fn test_invalid_yaml_fails() {
        let invalid_yaml = "this is not: valid: yaml: {{{}}}";
        let result = Config::from_yaml(invalid_yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_aggregation_fails() {
        let result = Config::from_yaml("search:\n  aggregation: median\n");
        assert!(result.is_err());
    }
}
