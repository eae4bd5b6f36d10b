//! Action labels and agent positions.
//!
//! The action space is the fixed set `{UP, DOWN, LEFT, RIGHT}`. A `Position` carries the last
//! move direction so reversals can be detected without history.

use serde::{Deserialize, Serialize};

/// Number of action labels.
pub const NUM_DIRECTIONS: usize = 4;

/// Movement direction; doubles as the action label reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions in canonical scan order.
    pub const ALL: [Direction; NUM_DIRECTIONS] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Grid offset `(dx, dy)`; `y` grows downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    /// Host-facing label, e.g. `"UP"`.
    pub fn label(self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        }
    }

    pub fn is_reverse_of(self, facing: Direction) -> bool {
        self == facing.opposite()
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Integer grid coordinates plus the direction of the last move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub facing: Direction,
}

impl Position {
    pub fn new(x: i32, y: i32, facing: Direction) -> Self {
        Self { x, y, facing }
    }

    /// The neighbouring cell in direction `d`, facing `d`.
    pub fn step(self, d: Direction) -> Position {
        let (dx, dy) = d.delta();
        Position {
            x: self.x + dx,
            y: self.y + dy,
            facing: d,
        }
    }

    /// Same cell, ignoring facing.
    pub fn same_cell(&self, other: &Position) -> bool {
        self.x == other.x && self.y == other.y
    }

    pub fn manhattan(&self, other: &Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}
