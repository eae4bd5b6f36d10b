//! Reference belief-state world: an ASCII maze with pellets and partially observed ghosts.
//!
//! Ghosts move one cell per turn to any open neighbour. After each move, every candidate cell
//! of a ghost that the agent can see (same row or column, no wall in between) becomes its own
//! outcome with that ghost certain; the unseen candidates stay grouped as one uncertain outcome.
//! A ghost certain to share the agent's cell costs one life.
//!
//! Blocked directions are merged into one "stay" plan entry whose labels are all the blocked
//! directions; staying keeps the agent's facing.

use thiserror::Error;

use crate::action::{Direction, Position};
use crate::belief::{BeliefState, StateKey};
use crate::grid::{Cell, Grid};
use crate::plan::{Outcomes, Plan};

/// Points for a regular pellet.
pub const PELLET_POINTS: i32 = 10;
/// Points for a super pellet.
pub const SUPER_PELLET_POINTS: i32 = 50;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MazeError {
    #[error("maze has no agent cell ('P')")]
    MissingAgent,
    #[error("maze has more than one agent cell ('P')")]
    MultipleAgents,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeBelief {
    grid: Grid,
    agent: Position,
    score: i32,
    lives: u32,
    /// Candidate cells per ghost, sorted by `(y, x)` without duplicate cells.
    ghosts: Vec<Vec<Position>>,
    pellets: u32,
    super_pellets: u32,
}

impl MazeBelief {
    /// Parse a maze.
    ///
    /// `P` agent (facing left), `G` a ghost in sight, `?` a candidate cell of one hidden ghost
    /// (all `?` cells belong to the same ghost), plus the [`Grid::from_rows`] cell characters.
    pub fn parse(rows: &[&str], lives: u32) -> Result<Self, MazeError> {
        let grid = Grid::from_rows(rows);
        let mut agent = None;
        let mut ghosts = Vec::new();
        let mut hidden = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let p = Position::new(x as i32, y as i32, Direction::Left);
                match ch {
                    'P' => {
                        if agent.replace(p).is_some() {
                            return Err(MazeError::MultipleAgents);
                        }
                    }
                    'G' => ghosts.push(vec![p]),
                    '?' => hidden.push(p),
                    _ => {}
                }
            }
        }
        let agent = agent.ok_or(MazeError::MissingAgent)?;
        if !hidden.is_empty() {
            ghosts.push(canonical_cells(hidden));
        }

        Ok(Self {
            pellets: grid.count(Cell::Pellet) + grid.count(Cell::SuperPellet),
            super_pellets: grid.count(Cell::SuperPellet),
            grid,
            agent,
            score: 0,
            lives,
            ghosts,
        })
    }

    pub fn with_facing(mut self, facing: Direction) -> Self {
        self.agent.facing = facing;
        self
    }

    pub fn with_score(mut self, score: i32) -> Self {
        self.score = score;
        self
    }

    pub fn with_lives(mut self, lives: u32) -> Self {
        self.lives = lives;
        self
    }

    /// State after the agent moves to `to` (eating whatever is there), before ghosts move.
    fn agent_moved(&self, to: Position) -> MazeBelief {
        let mut next = self.clone();
        next.agent = to;
        match next.grid.get(to.x, to.y) {
            Some(Cell::Pellet) => {
                next.grid.set(to.x, to.y, Cell::Empty);
                next.score += PELLET_POINTS;
                next.pellets -= 1;
            }
            Some(Cell::SuperPellet) => {
                next.grid.set(to.x, to.y, Cell::Empty);
                next.score += SUPER_PELLET_POINTS;
                next.pellets -= 1;
                next.super_pellets -= 1;
            }
            _ => {}
        }
        next
    }

    /// All outcomes of the agent ending its move on `to`.
    fn advance(&self, to: Position) -> Outcomes<MazeBelief> {
        let base = self.agent_moved(to);
        let per_ghost: Vec<Vec<Vec<Position>>> = base
            .ghosts
            .iter()
            .map(|cands| ghost_options(&base.grid, to, cands))
            .collect();

        let mut combos: Vec<Vec<Vec<Position>>> = vec![Vec::new()];
        for options in &per_ghost {
            let mut grown = Vec::with_capacity(combos.len() * options.len());
            for combo in &combos {
                for opt in options {
                    let mut c = combo.clone();
                    c.push(opt.clone());
                    grown.push(c);
                }
            }
            combos = grown;
        }

        combos
            .into_iter()
            .map(|ghosts| {
                let mut s = base.clone();
                let caught = ghosts
                    .iter()
                    .any(|g| g.len() == 1 && g[0].same_cell(&to));
                if caught {
                    s.lives = s.lives.saturating_sub(1);
                }
                s.ghosts = ghosts;
                s
            })
            .collect()
    }
}

/// Possible candidate sets of one ghost after it moves, split by what the agent at `eye` sees.
fn ghost_options(grid: &Grid, eye: Position, cands: &[Position]) -> Vec<Vec<Position>> {
    let mut spread = Vec::new();
    for c in cands {
        let before = spread.len();
        for d in Direction::ALL {
            let n = c.step(d);
            if grid.is_open(n.x, n.y) {
                spread.push(n);
            }
        }
        if spread.len() == before {
            spread.push(*c);
        }
    }
    let spread = canonical_cells(spread);

    let (seen, unseen): (Vec<Position>, Vec<Position>) = spread
        .into_iter()
        .partition(|p| line_of_sight(grid, eye, *p));

    let mut out: Vec<Vec<Position>> = seen.into_iter().map(|p| vec![p]).collect();
    if !unseen.is_empty() {
        out.push(unseen);
    }
    out
}

fn canonical_cells(mut cells: Vec<Position>) -> Vec<Position> {
    cells.sort_by_key(|p| (p.y, p.x));
    cells.dedup_by(|a, b| a.same_cell(b));
    cells
}

/// Same row or column with only open cells in between.
pub fn line_of_sight(grid: &Grid, a: Position, b: Position) -> bool {
    if a.x == b.x {
        let (lo, hi) = (a.y.min(b.y), a.y.max(b.y));
        (lo..=hi).all(|y| grid.is_open(a.x, y))
    } else if a.y == b.y {
        let (lo, hi) = (a.x.min(b.x), a.x.max(b.x));
        (lo..=hi).all(|x| grid.is_open(x, a.y))
    } else {
        false
    }
}

impl BeliefState for MazeBelief {
    fn score(&self) -> i32 {
        self.score
    }

    fn lives(&self) -> u32 {
        self.lives
    }

    fn pellets_remaining(&self) -> u32 {
        self.pellets
    }

    fn super_pellets_remaining(&self) -> u32 {
        self.super_pellets
    }

    fn agent_position(&self) -> Position {
        self.agent
    }

    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn ghost_count(&self) -> usize {
        self.ghosts.len()
    }

    fn possible_ghost_positions(&self, i: usize) -> &[Position] {
        &self.ghosts[i]
    }

    fn expand(&self) -> Plan<Self> {
        let mut plan = Plan::new();
        let mut blocked = Vec::new();
        for d in Direction::ALL {
            let to = self.agent.step(d);
            if self.grid.is_open(to.x, to.y) {
                plan.push(vec![d], self.advance(to));
            } else {
                blocked.push(d);
            }
        }
        if !blocked.is_empty() {
            plan.push(blocked, self.advance(self.agent));
        }
        plan
    }

    fn state_key(&self) -> StateKey {
        // Ghost facing is not observable and does not take part in the key.
        let mut h = blake3::Hasher::new();
        h.update(&self.grid.to_bytes());
        h.update(&self.agent.x.to_le_bytes());
        h.update(&self.agent.y.to_le_bytes());
        h.update(&[self.agent.facing.index()]);
        h.update(&self.score.to_le_bytes());
        h.update(&self.lives.to_le_bytes());
        h.update(&(self.ghosts.len() as u32).to_le_bytes());
        for g in &self.ghosts {
            h.update(&(g.len() as u32).to_le_bytes());
            for p in g {
                h.update(&p.x.to_le_bytes());
                h.update(&p.y.to_le_bytes());
            }
        }
        let digest = h.finalize();
        let mut key = [0u8; 16];
        key.copy_from_slice(&digest.as_bytes()[..16]);
        u128::from_le_bytes(key)
    }
}
