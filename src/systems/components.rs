use bevy_ecs::{bundle::Bundle, component::Component, resource::Resource};
use bitflags::bitflags;
use glam::{IVec2, Vec2};
use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::constants::{
    boss, hide, GHOST_BASE_RANGE, GHOST_SPAWN_TILE, PLAYER_SPAWN_TILE, PLAYER_SPEED,
};
use crate::map::direction::Direction;
use crate::systems::{
    motion::{Body, Position, Velocity},
    targeting::{Personality, RoamTarget},
};

/// A tag component for entities that are controlled by the player.
#[derive(Default, Component)]
pub struct PlayerControlled;

/// The direction the input layer last asked for.
///
/// It stays buffered until the player can actually turn that way.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RequestedDirection(pub Option<Direction>);

bitflags! {
    /// Reasons the player is currently immune to ghost encounters.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ShieldFlags: u8 {
        const HIDDEN = 1 << 0;
        const GRACE = 1 << 1;
    }
}

/// Tick counters for the player's temporary immunities.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Shields {
    /// Ticks left hidden.
    pub hidden_ticks: u32,
    /// Ticks before hiding may be used again, counted from activation.
    pub hide_cooldown: u32,
    /// Ticks left of the post-boss-spawn grace window.
    pub grace_ticks: u32,
}

impl Shields {
    pub fn active(&self) -> ShieldFlags {
        let mut flags = ShieldFlags::empty();
        flags.set(ShieldFlags::HIDDEN, self.hidden_ticks > 0);
        flags.set(ShieldFlags::GRACE, self.grace_ticks > 0);
        flags
    }

    /// Whether ghost encounters are skipped entirely this tick.
    pub fn suppresses_encounters(&self) -> bool {
        !self.active().is_empty()
    }

    /// Starts hiding if it is off cooldown. Returns whether hiding started.
    pub fn try_hide(&mut self) -> bool {
        if self.hide_cooldown > 0 || self.hidden_ticks > 0 {
            return false;
        }
        self.hidden_ticks = hide::DURATION_TICKS;
        self.hide_cooldown = hide::COOLDOWN_TICKS;
        true
    }

    pub fn grant_grace(&mut self) {
        self.grace_ticks = boss::GRACE_TICKS;
    }

    /// Counts every timer down by one tick.
    pub fn tick(&mut self) {
        self.hidden_ticks = self.hidden_ticks.saturating_sub(1);
        self.hide_cooldown = self.hide_cooldown.saturating_sub(1);
        self.grace_ticks = self.grace_ticks.saturating_sub(1);
    }
}

/// A ghost's identity and scare state. Its speed lives in [`Velocity`].
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Ghost {
    pub personality: Personality,
    pub scared: bool,
    /// Speed before the current scare, restored when it ends.
    pub saved_speed: Option<f32>,
    /// Detection range in tiles; only range-gated personalities use it.
    pub detection_range: f32,
}

impl Ghost {
    pub fn new(personality: Personality, detection_range: f32) -> Self {
        Self {
            personality,
            scared: false,
            saved_speed: None,
            detection_range,
        }
    }

    pub fn is_boss(&self) -> bool {
        self.personality == Personality::Boss
    }

    /// Marks the ghost scared and slows it. A ghost that is already scared is left alone.
    pub fn frighten(&mut self, velocity: &mut Velocity, factor: f32) {
        if self.scared {
            return;
        }
        self.scared = true;
        self.saved_speed = Some(velocity.speed);
        velocity.speed *= factor;
    }

    /// Clears the scare and restores the saved speed.
    pub fn calm(&mut self, velocity: &mut Velocity) {
        self.scared = false;
        if let Some(speed) = self.saved_speed.take() {
            velocity.speed = speed;
        }
    }
}

/// Where a regular ghost reappears after being eaten.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnPoint(pub IVec2);

#[derive(Bundle)]
pub struct PlayerBundle {
    pub player: PlayerControlled,
    pub position: Position,
    pub body: Body,
    pub velocity: Velocity,
    pub requested: RequestedDirection,
    pub shields: Shields,
}

impl Default for PlayerBundle {
    fn default() -> Self {
        Self {
            player: PlayerControlled,
            position: Position::at_tile(PLAYER_SPAWN_TILE),
            body: Body::default(),
            velocity: Velocity {
                direction: None,
                speed: PLAYER_SPEED,
            },
            requested: RequestedDirection::default(),
            shields: Shields::default(),
        }
    }
}

#[derive(Bundle)]
pub struct GhostBundle {
    pub ghost: Ghost,
    pub spawn: SpawnPoint,
    pub position: Position,
    pub body: Body,
    pub velocity: Velocity,
    pub roam: RoamTarget,
}

impl GhostBundle {
    /// Where the `index`-th ghost of a roster starts and returns to after being eaten.
    pub fn spawn_tile(index: usize) -> IVec2 {
        GHOST_SPAWN_TILE + IVec2::splat((index % 2) as i32)
    }

    /// The `index`-th ghost of a roster. Spawn tile and range both depend on the index.
    pub fn regular(index: usize, personality: Personality, rng: &mut impl Rng) -> Self {
        let spawn = Self::spawn_tile(index);
        Self {
            ghost: Ghost::new(personality, GHOST_BASE_RANGE + index as f32),
            spawn: SpawnPoint(spawn),
            position: Position::at_tile(spawn),
            body: Body::default(),
            velocity: Velocity {
                direction: Some(Direction::Right),
                speed: personality.speed(),
            },
            roam: RoamTarget::new(personality, rng),
        }
    }
}

/// A boss ghost. Bosses have no spawn point: once eaten they are gone.
#[derive(Bundle)]
pub struct BossBundle {
    pub ghost: Ghost,
    pub position: Position,
    pub body: Body,
    pub velocity: Velocity,
    pub roam: RoamTarget,
}

impl BossBundle {
    pub fn new(position: Vec2, rng: &mut impl Rng) -> Self {
        Self {
            ghost: Ghost::new(Personality::Boss, boss::DETECTION_RANGE),
            position: Position(position),
            body: Body::default(),
            velocity: Velocity {
                direction: Some(Direction::Right),
                speed: Personality::Boss.speed(),
            },
            roam: RoamTarget::new(Personality::Boss, rng),
        }
    }
}

/// Running score of the session.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScoreResource(pub u32);

/// Lives left, including the one in play.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerLives(pub u8);

/// The personalities to recreate after every lost life.
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct Roster(pub Vec<Personality>);

/// The single source of randomness in a session.
#[derive(Resource, Debug, Clone)]
pub struct GameRng(pub SmallRng);

impl GameRng {
    /// A reproducible generator, or one seeded from the OS when `seed` is absent.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(SmallRng::seed_from_u64(seed)),
            None => Self(SmallRng::from_os_rng()),
        }
    }
}
