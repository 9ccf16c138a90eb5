//! Power mode: the window in which ghosts can be eaten, and what happens when the player
//! and a ghost meet.

use bevy_ecs::{
    entity::Entity,
    event::EventWriter,
    query::{With, Without},
    resource::Resource,
    system::{Commands, Query, ResMut},
};
use tracing::{debug, info};

use crate::constants::{
    power::{BOSS_POINTS, COMBO_BASE_POINTS, COMBO_MAX_POINTS, DURATION_TICKS, SCARED_SPEED_FACTOR},
    DEATH_SEQUENCE_TICKS,
};
use crate::events::GameEvent;
use crate::systems::{
    components::{Ghost, PlayerControlled, ScoreResource, Shields, SpawnPoint},
    motion::{Position, Velocity},
    stage::GameStage,
};

/// Whether ghosts are currently vulnerable.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PowerMode {
    #[default]
    Inactive,
    Active {
        /// Ticks until ghosts recover.
        remaining_ticks: u32,
        /// Ghosts eaten during this activation.
        combo: u32,
    },
}

impl PowerMode {
    pub fn is_active(&self) -> bool {
        matches!(self, PowerMode::Active { .. })
    }

    pub fn remaining_ticks(&self) -> u32 {
        match self {
            PowerMode::Active { remaining_ticks, .. } => *remaining_ticks,
            PowerMode::Inactive => 0,
        }
    }

    pub fn combo(&self) -> u32 {
        match self {
            PowerMode::Active { combo, .. } => *combo,
            PowerMode::Inactive => 0,
        }
    }

    /// Starts (or restarts) a full-length activation with a fresh combo.
    pub fn activate(&mut self) {
        *self = PowerMode::Active {
            remaining_ticks: DURATION_TICKS,
            combo: 0,
        };
    }

    pub fn deactivate(&mut self) {
        *self = PowerMode::Inactive;
    }

    /// Counts down one tick. Returns true on the tick the activation runs out.
    pub fn tick(&mut self) -> bool {
        let PowerMode::Active { remaining_ticks, .. } = self else {
            return false;
        };
        *remaining_ticks = remaining_ticks.saturating_sub(1);
        if *remaining_ticks == 0 {
            *self = PowerMode::Inactive;
            return true;
        }
        false
    }

    /// Counts a ghost kill and returns the new combo, or `None` when inactive.
    pub fn record_kill(&mut self) -> Option<u32> {
        match self {
            PowerMode::Active { combo, .. } => {
                *combo += 1;
                Some(*combo)
            }
            PowerMode::Inactive => None,
        }
    }
}

/// Points for the `combo`-th ordinary ghost of an activation: 200, 400, 800, then 1600 onward.
pub fn combo_points(combo: u32) -> u32 {
    if combo == 0 {
        return 0;
    }
    (1..combo).fold(COMBO_BASE_POINTS, |points, _| (points * 2).min(COMBO_MAX_POINTS))
}

/// Turns power mode on and frightens every ghost.
pub fn activate_power_mode<'a>(power: &mut PowerMode, ghosts: impl Iterator<Item = (&'a mut Ghost, &'a mut Velocity)>) {
    let renewed = power.is_active();
    power.activate();
    let mut frightened = 0;
    for (ghost, velocity) in ghosts {
        if !ghost.scared {
            frightened += 1;
        }
        ghost.frighten(velocity, SCARED_SPEED_FACTOR);
    }
    debug!(renewed, frightened, "Power mode activated");
}

/// Turns power mode off and restores every ghost.
pub fn deactivate_power_mode<'a>(power: &mut PowerMode, ghosts: impl Iterator<Item = (&'a mut Ghost, &'a mut Velocity)>) {
    power.deactivate();
    for (ghost, velocity) in ghosts {
        ghost.calm(velocity);
    }
}

/// Counts power mode down and restores the ghosts when it runs out.
pub fn power_timer_system(
    mut power: ResMut<PowerMode>,
    mut events: EventWriter<GameEvent>,
    mut ghosts: Query<(&mut Ghost, &mut Velocity)>,
) {
    if power.tick() {
        deactivate_power_mode(
            &mut power,
            ghosts.iter_mut().map(|(ghost, velocity)| (ghost.into_inner(), velocity.into_inner())),
        );
        debug!("Power mode expired");
        events.write(GameEvent::PowerModeEnded);
    }
}

/// Resolves every ghost sharing the player's tile.
///
/// Scared ghosts are eaten while power mode is on; any other ghost catches the player, which
/// ends resolution for the tick. Hiding and the grace window skip the check entirely.
#[allow(clippy::too_many_arguments)]
pub fn encounter_system(
    mut commands: Commands,
    mut power: ResMut<PowerMode>,
    mut score: ResMut<ScoreResource>,
    mut stage: ResMut<GameStage>,
    mut events: EventWriter<GameEvent>,
    players: Query<(&Position, &Shields), With<PlayerControlled>>,
    mut ghosts: Query<
        (Entity, &mut Ghost, &mut Position, &mut Velocity, Option<&SpawnPoint>),
        Without<PlayerControlled>,
    >,
) {
    let Ok((player, shields)) = players.single() else {
        return;
    };
    if shields.suppresses_encounters() {
        return;
    }

    let player_tile = player.tile();
    let mut caught = false;
    for (entity, mut ghost, mut position, mut velocity, spawn) in ghosts.iter_mut() {
        if position.tile() != player_tile {
            continue;
        }

        if power.is_active() && ghost.scared {
            let combo = power.record_kill().unwrap_or(1);
            if ghost.is_boss() {
                score.0 += BOSS_POINTS;
                commands.entity(entity).despawn();
                info!(combo, points = BOSS_POINTS, "Boss eaten");
                events.write(GameEvent::GhostEaten {
                    points: BOSS_POINTS,
                    boss: true,
                });
                continue;
            }

            let points = combo_points(combo);
            score.0 += points;
            ghost.calm(&mut velocity);
            if let Some(spawn) = spawn {
                *position = Position::at_tile(spawn.0);
            }
            debug!(personality = ghost.personality.as_ref(), combo, points, "Ghost eaten");
            events.write(GameEvent::GhostEaten { points, boss: false });
        } else if !ghost.scared {
            debug!(personality = ghost.personality.as_ref(), tile = ?player_tile, "Player caught");
            caught = true;
            break;
        }
    }

    if caught {
        deactivate_power_mode(
            &mut power,
            ghosts
                .iter_mut()
                .map(|(_, ghost, _, velocity, _)| (ghost.into_inner(), velocity.into_inner())),
        );
        *stage = GameStage::PlayerDying {
            remaining_ticks: DEATH_SEQUENCE_TICKS,
        };
        events.write(GameEvent::PlayerCaught);
    }
}
