//! Cell map shared by belief states and the heuristic.

use crate::action::{Direction, Position};

/// Default cap for the nearest-pellet ring search.
pub const DEFAULT_PELLET_SEARCH_RADIUS: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Wall,
    Empty,
    Pellet,
    SuperPellet,
}

impl Cell {
    pub fn is_wall(self) -> bool {
        matches!(self, Cell::Wall)
    }

    /// Regular and super pellets both count as goal cells.
    pub fn is_pellet(self) -> bool {
        matches!(self, Cell::Pellet | Cell::SuperPellet)
    }

    fn to_byte(self) -> u8 {
        match self {
            Cell::Wall => b'#',
            Cell::Empty => b' ',
            Cell::Pellet => b'.',
            Cell::SuperPellet => b'*',
        }
    }
}

/// Row-major 2D cell map. Column index is `x`, row index is `y`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// A grid of `Empty` cells.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        }
    }

    /// Parse ASCII rows: `#` wall, `.` pellet, `*` super pellet, anything else empty.
    ///
    /// Rows shorter than the widest row are padded with walls.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut g = Grid {
            width,
            height,
            cells: vec![Cell::Wall; width * height],
        };
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                g.cells[y * width + x] = match ch {
                    '#' => Cell::Wall,
                    '.' => Cell::Pellet,
                    '*' => Cell::SuperPellet,
                    _ => Cell::Empty,
                };
            }
        }
        g
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// `None` for out-of-bounds coordinates.
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }

    /// Out-of-bounds cells are treated as walls.
    pub fn is_open(&self, x: i32, y: i32) -> bool {
        matches!(self.get(x, y), Some(c) if !c.is_wall())
    }

    pub fn count(&self, cell: Cell) -> u32 {
        self.cells.iter().filter(|&&c| c == cell).count() as u32
    }

    /// Number of open 4-neighbours around `(x, y)`.
    pub fn open_neighbours(&self, x: i32, y: i32) -> u32 {
        Direction::ALL
            .iter()
            .filter(|d| {
                let (dx, dy) = d.delta();
                self.is_open(x + dx, y + dy)
            })
            .count() as u32
    }

    /// Stable byte encoding of the cell map (used for canonical state keys).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.cells.len() + 8);
        out.extend_from_slice(&(self.width as u32).to_le_bytes());
        out.extend_from_slice(&(self.height as u32).to_le_bytes());
        out.extend(self.cells.iter().map(|c| c.to_byte()));
        out
    }
}

/// Manhattan distance from `from` to the closest pellet cell, searching outward ring by ring.
///
/// Ring `d` holds every offset with `|dx| + |dy| == d`; the first ring containing a pellet wins.
/// Offsets that fall outside the grid are skipped. Returns `None` when no pellet lies within
/// `max_radius`.
pub fn nearest_pellet(grid: &Grid, from: Position, max_radius: u32) -> Option<u32> {
    let r_max = max_radius as i32;
    for d in 0..=r_max {
        for dx in -d..=d {
            let rest = d - dx.abs();
            let x = from.x + dx;
            if grid.get(x, from.y + rest).is_some_and(Cell::is_pellet)
                || (rest != 0 && grid.get(x, from.y - rest).is_some_and(Cell::is_pellet))
            {
                return Some(d as u32);
            }
        }
    }
    None
}
