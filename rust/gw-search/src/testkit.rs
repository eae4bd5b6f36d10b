//! Hand-scripted belief trees for engine tests.
//!
//! Every node sits on the same 5x5 open board with the agent at (2,2) and one pellet at (4,2),
//! so with `HeuristicConfig::core_terms_only()` a live node that has not made pellet progress
//! evaluates to `score - 20`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use gw_core::{
    nearest_pellet, BeliefState, Cell, Config, Direction, Grid, HeuristicConfig, Outcomes, Plan, Position,
    SearchConfig, StateKey,
};

struct Node {
    facing: Direction,
    score: i32,
    lives: u32,
    pellets: u32,
    /// Reported instead of the grid search when set.
    pellet_distance: Option<u32>,
    entries: Vec<(Vec<Direction>, Vec<usize>)>,
}

pub struct ScriptTree {
    nodes: Vec<Node>,
    grid: Grid,
    expansions: Vec<AtomicUsize>,
}

impl ScriptTree {
    pub fn state(self: &Arc<Self>, id: usize) -> ScriptedBelief {
        ScriptedBelief {
            tree: Arc::clone(self),
            id,
        }
    }

    /// Times `expand()` was called on node `id`.
    pub fn expansions(&self, id: usize) -> usize {
        self.expansions[id].load(Ordering::SeqCst)
    }

    pub fn key(&self, id: usize) -> StateKey {
        id as StateKey
    }
}

#[derive(Default)]
pub struct ScriptBuilder {
    nodes: Vec<Node>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live node with one life and one pellet left.
    pub fn node(&mut self, facing: Direction, score: i32) -> usize {
        self.nodes.push(Node {
            facing,
            score,
            lives: 1,
            pellets: 1,
            pellet_distance: None,
            entries: Vec::new(),
        });
        self.nodes.len() - 1
    }

    pub fn dead(&mut self, id: usize) -> &mut Self {
        self.nodes[id].lives = 0;
        self
    }

    pub fn pellets(&mut self, id: usize, n: u32) -> &mut Self {
        self.nodes[id].pellets = n;
        self
    }

    pub fn pellet_distance(&mut self, id: usize, d: u32) -> &mut Self {
        self.nodes[id].pellet_distance = Some(d);
        self
    }

    pub fn entry(&mut self, id: usize, actions: &[Direction], children: &[usize]) -> &mut Self {
        self.nodes[id]
            .entries
            .push((actions.to_vec(), children.to_vec()));
        self
    }

    pub fn build(self) -> Arc<ScriptTree> {
        let mut grid = Grid::new(5, 5);
        grid.set(4, 2, Cell::Pellet);
        let expansions = (0..self.nodes.len()).map(|_| AtomicUsize::new(0)).collect();
        Arc::new(ScriptTree {
            nodes: self.nodes,
            grid,
            expansions,
        })
    }
}

#[derive(Clone)]
pub struct ScriptedBelief {
    tree: Arc<ScriptTree>,
    id: usize,
}

impl ScriptedBelief {
    fn node(&self) -> &Node {
        &self.tree.nodes[self.id]
    }
}

impl BeliefState for ScriptedBelief {
    fn score(&self) -> i32 {
        self.node().score
    }

    fn lives(&self) -> u32 {
        self.node().lives
    }

    fn pellets_remaining(&self) -> u32 {
        self.node().pellets
    }

    fn super_pellets_remaining(&self) -> u32 {
        0
    }

    fn agent_position(&self) -> Position {
        Position::new(2, 2, self.node().facing)
    }

    fn grid(&self) -> &Grid {
        &self.tree.grid
    }

    fn ghost_count(&self) -> usize {
        0
    }

    fn nearest_pellet_distance(&self, max_radius: u32) -> Option<u32> {
        match self.node().pellet_distance {
            Some(d) => Some(d).filter(|&d| d <= max_radius),
            None => nearest_pellet(&self.tree.grid, self.agent_position(), max_radius),
        }
    }

    fn possible_ghost_positions(&self, _i: usize) -> &[Position] {
        &[]
    }

    fn expand(&self) -> Plan<Self> {
        self.tree.expansions[self.id].fetch_add(1, Ordering::SeqCst);
        let mut plan = Plan::new();
        for (actions, children) in &self.node().entries {
            let outcomes: Outcomes<Self> = children.iter().map(|&c| self.tree.state(c)).collect();
            plan.push(actions.clone(), outcomes);
        }
        plan
    }

    fn state_key(&self) -> StateKey {
        self.tree.key(self.id)
    }
}

/// Exhaustive search settings: every child kept, no reversal pruning.
pub fn exhaustive(max_depth: u32) -> SearchConfig {
    SearchConfig {
        max_depth,
        max_expand: 1000.0,
        prune_reversals: false,
        ..SearchConfig::default()
    }
}

pub fn core_config(search: SearchConfig) -> Config {
    Config {
        search,
        heuristic: HeuristicConfig::core_terms_only(),
        ..Config::default()
    }
}
