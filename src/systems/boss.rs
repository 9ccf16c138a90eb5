use bevy_ecs::{
    event::EventWriter,
    query::With,
    resource::Resource,
    system::{Commands, Query, ResMut},
};
use tracing::{debug, info};

use crate::constants::boss::{SPAWN_INTERVAL, WARNING_TICKS};
use crate::events::GameEvent;
use crate::systems::{
    components::{BossBundle, GameRng, PlayerControlled, Shields},
    motion::Position,
};

/// Counts playing ticks toward the next boss.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BossSchedule {
    pub enabled: bool,
    /// Ticks since the last spawn.
    pub elapsed: u32,
    /// Ticks left of the current warning, zero when none is showing.
    pub warning_ticks: u32,
    /// Bosses spawned this session.
    pub spawned: u32,
}

impl BossSchedule {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            elapsed: 0,
            warning_ticks: 0,
            spawned: 0,
        }
    }

    pub fn is_warning(&self) -> bool {
        self.warning_ticks > 0
    }
}

/// Warns shortly before each interval ends, then drops a boss right on top of the player
/// and grants a short grace window.
pub fn boss_schedule_system(
    mut commands: Commands,
    mut schedule: ResMut<BossSchedule>,
    mut rng: ResMut<GameRng>,
    mut events: EventWriter<GameEvent>,
    mut players: Query<(&Position, &mut Shields), With<PlayerControlled>>,
) {
    if !schedule.enabled {
        return;
    }

    schedule.elapsed += 1;
    schedule.warning_ticks = schedule.warning_ticks.saturating_sub(1);
    if schedule.elapsed == SPAWN_INTERVAL - WARNING_TICKS {
        debug!(elapsed = schedule.elapsed, "Boss incoming");
        schedule.warning_ticks = WARNING_TICKS;
        events.write(GameEvent::BossWarning);
    }

    if schedule.elapsed >= SPAWN_INTERVAL {
        if let Ok((position, mut shields)) = players.single_mut() {
            schedule.spawned += 1;
            commands.spawn(BossBundle::new(position.0, &mut rng.0));
            shields.grant_grace();
            info!(count = schedule.spawned, position = ?position.0, "Boss spawned");
            events.write(GameEvent::BossSpawned {
                count: schedule.spawned,
            });
        }
        schedule.elapsed = 0;
        schedule.warning_ticks = 0;
    }
}
