//! Ghost personalities and how each one picks the point it heads for.
//!
//! Targets are pixel positions produced fresh every tick; nothing here is stored between ticks
//! except the roam anchor index.

use bevy_ecs::{component::Component, system::Query};
use glam::Vec2;
use rand::Rng;
use strum_macros::AsRefStr;
use tracing::{trace, warn};

use crate::constants::{
    boss,
    targeting::{AMBUSH_LOOKAHEAD_TILES, ERRATIC_CORNER_CHANCE, ERRATIC_ROAM_PERIOD, ROAM_PERIOD, SHY_FLEE_RADIUS_TILES},
    GHOST_RANGE_FACTOR, PLAYER_SPEED, TILE_SIZE,
};
use crate::map::{direction::Direction, grid::Maze};
use crate::systems::motion::tile_of;

/// How a ghost chooses its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Personality {
    /// Heads straight for the player.
    Direct,
    /// Aims a few tiles ahead of the player.
    Ambush,
    /// Mostly chases, sometimes darts to a random corner.
    Erratic,
    /// Chases from afar, flees to the far corner up close.
    Shy,
    /// A direct chaser that is never range gated and does not respawn.
    Boss,
}

impl Personality {
    /// Parses a personality from either its behavior name or its classic ghost name.
    ///
    /// Unknown names fall back to [`Personality::Direct`].
    pub fn from_name(name: &str) -> Personality {
        match name.trim().to_ascii_lowercase().as_str() {
            "direct" | "blinky" => Personality::Direct,
            "ambush" | "pinky" => Personality::Ambush,
            "erratic" | "inky" => Personality::Erratic,
            "shy" | "clyde" => Personality::Shy,
            "boss" => Personality::Boss,
            _ => {
                warn!(name, "Unknown ghost personality, falling back to direct chase");
                Personality::Direct
            }
        }
    }

    /// The player's speed is divided by this to get the ghost's base speed.
    pub fn speed_divisor(self) -> f32 {
        match self {
            Personality::Direct => 1.8,
            Personality::Shy => 2.2,
            Personality::Ambush | Personality::Erratic => 2.0,
            Personality::Boss => boss::SPEED_DIVISOR,
        }
    }

    /// Base speed in pixels per tick.
    pub fn speed(self) -> f32 {
        PLAYER_SPEED / self.speed_divisor()
    }

    /// Whether pursuit is limited to the ghost's detection range.
    pub fn is_range_gated(self) -> bool {
        matches!(self, Personality::Erratic | Personality::Shy)
    }

    /// Ticks between roam anchor rotations.
    pub fn roam_period(self) -> u32 {
        match self {
            Personality::Erratic => ERRATIC_ROAM_PERIOD,
            _ => ROAM_PERIOD,
        }
    }
}

/// What targeting needs to know about the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quarry {
    pub position: Vec2,
    pub direction: Option<Direction>,
}

/// The corner anchor a ghost patrols toward when it is not pursuing.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoamTarget {
    /// Index into [`Maze::corner_anchors`].
    pub index: usize,
    pub period: u32,
    /// Ticks until the next rotation.
    pub countdown: u32,
}

impl RoamTarget {
    /// Starts at a random anchor.
    pub fn new(personality: Personality, rng: &mut impl Rng) -> Self {
        let period = personality.roam_period();
        Self {
            index: rng.random_range(0..4),
            period,
            countdown: period,
        }
    }

    /// Advances one tick, rotating to the next anchor when the period elapses.
    pub fn tick(&mut self) {
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown == 0 {
            self.index = (self.index + 1) % 4;
            self.countdown = self.period;
        }
    }
}

/// Whether a ghost at `ghost` chases the player this tick rather than roaming.
///
/// Range-gated personalities compare the Euclidean distance between the two top-left tiles
/// against `range * 1.5`; everyone else always pursues.
pub fn is_pursuing(personality: Personality, ghost: Vec2, player: Vec2, range: f32) -> bool {
    if !personality.is_range_gated() {
        return true;
    }
    let distance = (tile_of(player) - tile_of(ghost)).as_vec2().length();
    distance <= range * GHOST_RANGE_FACTOR
}

/// The pursuit target of a ghost at `ghost`.
pub fn pursuit_target(personality: Personality, ghost: Vec2, quarry: &Quarry, maze: &Maze, rng: &mut impl Rng) -> Vec2 {
    match personality {
        Personality::Direct | Personality::Boss => quarry.position,
        Personality::Ambush => ambush_target(quarry, maze),
        Personality::Erratic => {
            if rng.random_bool(ERRATIC_CORNER_CHANCE) {
                maze.corner_anchors()[rng.random_range(0..4)]
            } else {
                quarry.position
            }
        }
        Personality::Shy => {
            if ghost.distance(quarry.position) < SHY_FLEE_RADIUS_TILES * TILE_SIZE {
                farthest_anchor(quarry.position, maze)
            } else {
                quarry.position
            }
        }
    }
}

/// Where a ghost heads this tick: its pursuit target, or its roam anchor when out of range.
pub fn choose_target(
    personality: Personality,
    ghost: Vec2,
    range: f32,
    roam: &RoamTarget,
    quarry: &Quarry,
    maze: &Maze,
    rng: &mut impl Rng,
) -> Vec2 {
    if is_pursuing(personality, ghost, quarry.position, range) {
        pursuit_target(personality, ghost, quarry, maze, rng)
    } else {
        trace!(personality = personality.as_ref(), anchor = roam.index, "Ghost roaming");
        maze.corner_anchors()[roam.index % 4]
    }
}

/// Looks ahead of the player along its heading, clamped to the last tile in each axis.
fn ambush_target(quarry: &Quarry, maze: &Maze) -> Vec2 {
    let Some(direction) = quarry.direction else {
        return quarry.position;
    };
    let ahead = quarry.position + direction.as_vec2() * AMBUSH_LOOKAHEAD_TILES * TILE_SIZE;
    let limit = maze.pixel_size() - Vec2::splat(TILE_SIZE);
    ahead.clamp(Vec2::ZERO, limit)
}

/// The corner anchor farthest from `from`; the first one wins ties.
fn farthest_anchor(from: Vec2, maze: &Maze) -> Vec2 {
    let anchors = maze.corner_anchors();
    let mut farthest = anchors[0];
    let mut best = 0.0;
    for anchor in anchors {
        let distance = from.distance(anchor);
        if distance > best {
            best = distance;
            farthest = anchor;
        }
    }
    farthest
}

/// Rotates every ghost's roam anchor on its own period.
pub fn roam_rotation_system(mut roamers: Query<&mut RoamTarget>) {
    for mut roam in roamers.iter_mut() {
        roam.tick();
    }
}
