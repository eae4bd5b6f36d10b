//! Shared maze fixtures for the gw benches.

use gw_core::{Direction, MazeBelief, MazeError};

/// Open board with walls, a hidden ghost on the bottom row and pellets spread around.
pub const ARENA: [&str; 9] = [
    "###############",
    "#.....#.......#",
    "#.###.#.#####.#",
    "#.#.......#...#",
    "#...##P##.#.#*#",
    "#.#.......#...#",
    "#.###.#.#####.#",
    "#?.....#.....?#",
    "###############",
];

/// Long corridor with one certain ghost behind the agent.
pub const CORRIDOR: [&str; 3] = ["#################", "#..G.P.........*#", "#################"];

pub fn arena() -> Result<MazeBelief, MazeError> {
    Ok(MazeBelief::parse(&ARENA, 3)?.with_facing(Direction::Up))
}

pub fn corridor() -> Result<MazeBelief, MazeError> {
    Ok(MazeBelief::parse(&CORRIDOR, 3)?.with_facing(Direction::Right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gw_core::BeliefState;

    #[test]
    fn fixtures_parse() {
        let a = arena().unwrap();
        assert_eq!(a.ghost_count(), 1);
        assert!(a.pellets_remaining() > 20);
        let c = corridor().unwrap();
        assert_eq!(c.ghosts_in_sight(), 1);
        assert_eq!(c.super_pellets_remaining(), 1);
    }
}
