//! Shortest-path direction resolution over the tile grid.
//!
//! The maze is treated as an unweighted graph whose vertices are passable tiles. Only the
//! first step of a shortest path is ever used, and it is recomputed from scratch every tick.

use glam::IVec2;
use pathfinding::prelude::bfs;
use smallvec::SmallVec;
use tracing::trace;

use crate::map::direction::Direction;
use crate::map::grid::Maze;

/// Passable neighbors of `tile`, in [`Direction::SEARCH_ORDER`].
fn successors(maze: &Maze, tile: IVec2) -> SmallVec<[IVec2; 4]> {
    Direction::SEARCH_ORDER
        .iter()
        .map(|direction| tile + direction.as_ivec2())
        .filter(|neighbor| maze.is_passable(*neighbor))
        .collect()
}

/// Returns the first step of a shortest path from `from` to `to`.
///
/// Ties between equally short paths go to the first direction in
/// [`Direction::SEARCH_ORDER`] (Left, Right, Up, Down). Returns `None` when the
/// destination is unreachable or already reached; callers keep their current direction.
pub fn resolve(maze: &Maze, from: IVec2, to: IVec2) -> Option<Direction> {
    let Some(path) = bfs(&from, |&tile| successors(maze, tile), |&tile| tile == to) else {
        trace!(from = ?from, to = ?to, "Destination unreachable");
        return None;
    };

    let next = *path.get(1)?;
    Direction::from_offset(next - from)
}

/// Rewrites a resolved direction when the actor straddles two tiles.
///
/// `near` is the tile of the actor's top-left corner and `far` the tile of its bottom-right
/// corner. A horizontal move while rows differ becomes Up; Up while columns differ becomes Left.
/// Both rules apply in that order, so a horizontal move can end up as Left.
pub fn align_to_corridor(direction: Direction, near: IVec2, far: IVec2) -> Direction {
    let mut direction = direction;
    if near.y != far.y && direction.is_horizontal() {
        direction = Direction::Up;
    }
    if near.x != far.x && direction == Direction::Up {
        direction = Direction::Left;
    }
    direction
}
