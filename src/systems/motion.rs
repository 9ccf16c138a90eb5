//! The pixel/tile motion model shared by Pac-Man and the ghosts.
//!
//! Actors are axis-aligned boxes positioned by their top-left pixel. A box may straddle
//! up to four tiles, so collision samples the tile under each of its four corners.

use bevy_ecs::component::Component;
use glam::{IVec2, Vec2};

use crate::constants::TILE_SIZE;
use crate::map::{direction::Direction, grid::Maze};

/// Top-left corner of an actor, in pixels.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Position(pub Vec2);

impl Position {
    /// Places an actor exactly on a tile.
    pub fn at_tile(tile: IVec2) -> Self {
        Self(tile.as_vec2() * TILE_SIZE)
    }

    pub fn tile(&self) -> IVec2 {
        tile_of(self.0)
    }
}

/// Size of an actor's bounding box, in pixels.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub size: Vec2,
}

impl Default for Body {
    fn default() -> Self {
        Self { size: Vec2::splat(TILE_SIZE) }
    }
}

/// Heading and speed of an actor.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Velocity {
    /// `None` until the actor first starts moving.
    pub direction: Option<Direction>,
    /// Pixels per tick; may be fractional.
    pub speed: f32,
}

/// Tile containing the pixel `position`.
pub fn tile_of(position: Vec2) -> IVec2 {
    (position / TILE_SIZE).floor().as_ivec2()
}

/// Tile containing the bottom-right pixel of a box at `position`.
pub fn far_tile_of(position: Vec2, size: Vec2) -> IVec2 {
    tile_of(position + size - Vec2::ONE)
}

/// Moves `position` by `speed` pixels along a single axis.
pub fn advance(position: Vec2, direction: Direction, speed: f32) -> Vec2 {
    position + direction.as_vec2() * speed
}

/// Whether a box at `position` leaves the maze or touches a wall under any corner.
pub fn collides(position: Vec2, size: Vec2, maze: &Maze) -> bool {
    let bounds = maze.pixel_size();
    if position.x < 0.0 || position.y < 0.0 || position.x + size.x > bounds.x || position.y + size.y > bounds.y {
        return true;
    }

    let near = tile_of(position);
    let far = far_tile_of(position, size);
    [near, IVec2::new(far.x, near.y), IVec2::new(near.x, far.y), far]
        .into_iter()
        .any(|corner| !maze.is_passable(corner))
}

/// Tries one tick of movement without committing it.
///
/// Returns the new position if it would be legal, `None` if the move is blocked.
pub fn probe(position: Vec2, size: Vec2, direction: Direction, speed: f32, maze: &Maze) -> Option<Vec2> {
    let moved = advance(position, direction, speed);
    (!collides(moved, size, maze)).then_some(moved)
}

/// Moves forward if legal, otherwise stays put.
pub fn step(position: Vec2, size: Vec2, direction: Direction, speed: f32, maze: &Maze) -> Vec2 {
    probe(position, size, direction, speed, maze).unwrap_or(position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_of_uses_floor() {
        assert_eq!(tile_of(Vec2::new(0.0, 0.0)), IVec2::new(0, 0));
        assert_eq!(tile_of(Vec2::new(19.9, 39.9)), IVec2::new(0, 1));
        assert_eq!(tile_of(Vec2::new(20.0, 40.0)), IVec2::new(1, 2));
    }

    #[test]
    fn test_far_tile_is_inset() {
        let size = Vec2::splat(TILE_SIZE);
        assert_eq!(far_tile_of(Vec2::new(20.0, 20.0), size), IVec2::new(1, 1));
        assert_eq!(far_tile_of(Vec2::new(22.0, 20.0), size), IVec2::new(2, 1));
    }

    #[test]
    fn test_advance_is_axis_aligned() {
        let origin = Vec2::new(40.0, 40.0);
        assert_eq!(advance(origin, Direction::Right, 2.5), Vec2::new(42.5, 40.0));
        assert_eq!(advance(origin, Direction::Left, 2.5), Vec2::new(37.5, 40.0));
        assert_eq!(advance(origin, Direction::Up, 2.5), Vec2::new(40.0, 37.5));
        assert_eq!(advance(origin, Direction::Down, 2.5), Vec2::new(40.0, 42.5));
    }
}
