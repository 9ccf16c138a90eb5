//! This module contains all the constants used in the game.

use std::time::Duration;

use glam::{IVec2, UVec2};

/// Ticks per second of the fixed-rate game loop.
pub const TICK_RATE: u32 = 30;

pub const LOOP_TIME: Duration = Duration::from_nanos((1_000_000_000.0 / TICK_RATE as f64) as u64);

/// The size of each tile, in pixels.
pub const TILE_SIZE: f32 = 20.0;
/// The size of the game board, in tiles (columns, rows).
pub const BOARD_TILE_SIZE: UVec2 = UVec2::new(21, 23);

/// Pac-Man's speed in pixels per tick.
pub const PLAYER_SPEED: f32 = TILE_SIZE / 5.0;
/// The tile Pac-Man starts on (column, row).
pub const PLAYER_SPAWN_TILE: IVec2 = IVec2::new(1, 1);
pub const STARTING_LIVES: u8 = 3;

/// Number of ghosts in a default roster.
pub const DEFAULT_GHOST_COUNT: usize = 10;
/// Ghosts alternate between this tile and the one diagonally below-right of it.
pub const GHOST_SPAWN_TILE: IVec2 = IVec2::new(9, 10);
/// Base detection range in tiles; each ghost adds its roster index.
pub const GHOST_BASE_RANGE: f32 = 6.0;
/// Range-gated ghosts pursue while within `range * GHOST_RANGE_FACTOR` tiles.
pub const GHOST_RANGE_FACTOR: f32 = 1.5;

pub mod targeting {
    /// How far ahead of the player (in tiles) the ambusher aims.
    pub const AMBUSH_LOOKAHEAD_TILES: f32 = 4.0;
    /// Chance per tick that the erratic ghost aims at a random corner instead of the player.
    pub const ERRATIC_CORNER_CHANCE: f64 = 0.3;
    /// The shy ghost flees when closer than this many tiles.
    pub const SHY_FLEE_RADIUS_TILES: f32 = 8.0;
    /// Roam anchor rotation period for the erratic ghost.
    pub const ERRATIC_ROAM_PERIOD: u32 = 90;
    /// Roam anchor rotation period for every other ghost.
    pub const ROAM_PERIOD: u32 = 300;
}

pub mod power {
    /// Length of a power mode activation, in ticks.
    pub const DURATION_TICKS: u32 = 300;
    /// Multiplier applied to ghost speed while scared.
    pub const SCARED_SPEED_FACTOR: f32 = 0.6;
    pub const COMBO_BASE_POINTS: u32 = 200;
    pub const COMBO_MAX_POINTS: u32 = 1600;
    pub const BOSS_POINTS: u32 = 500;
}

pub mod boss {
    use glam::IVec2;

    /// Ticks between boss spawns.
    pub const SPAWN_INTERVAL: u32 = 1350;
    /// Ticks of warning before a boss appears.
    pub const WARNING_TICKS: u32 = 90;
    /// Ticks of invulnerability granted to the player when a boss appears.
    pub const GRACE_TICKS: u32 = 60;
    pub const SPEED_DIVISOR: f32 = 1.5;
    pub const DETECTION_RANGE: f32 = 12.0;
    /// Where surviving bosses are moved when the level restarts after a death.
    pub const RESTART_TILE: IVec2 = IVec2::new(10, 4);
}

pub mod hide {
    pub const DURATION_TICKS: u32 = 90;
    pub const COOLDOWN_TICKS: u32 = 300;
}

/// Length of the death sequence (12 frames, 100ms apart).
pub const DEATH_SEQUENCE_TICKS: u32 = 36;

pub mod score {
    pub const PELLET: u32 = 1;
    pub const POWER_PELLET: u32 = 50;
}

/// The raw layout of the game board.
///
/// `#` wall, ` ` empty, `.` pellet, `o` power pellet, `_` floor (already eaten).
pub const RAW_BOARD: [&str; BOARD_TILE_SIZE.y as usize] = [
    "#####################",
    "#.........#........o#",
    "#o###.###.#.###.###.#",
    "#.###.###.#.###.###.#",
    "#...................#",
    "#.###.#.#####.#.###.#",
    "#.....#...#...#.....#",
    "#####.###.#.###.#####",
    "    #.#.......#.#    ",
    "#####.#.##.##.#.#####",
    "........#...#........",
    "#####.#.#...#.#.#####",
    "    #.#.#####.#.#    ",
    "    #.#.......#.#    ",
    "#####...#####...#####",
    "#.........#.........#",
    "#.###.###.#.###.###.#",
    "#...#.....#.....#...#",
    "##..#.#.#####.#.#..##",
    "#.....#...#...#.....#",
    "#.#######.#.#######.#",
    "#o.................o#",
    "#####################",
];
