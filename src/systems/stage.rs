use bevy_ecs::{
    entity::Entity,
    event::EventWriter,
    query::{With, Without},
    resource::Resource,
    system::{Commands, Query, Res, ResMut},
};
use tracing::{debug, info};

use crate::constants::boss::RESTART_TILE;
use crate::events::GameEvent;
use crate::map::grid::Maze;
use crate::systems::{
    components::{GameRng, Ghost, GhostBundle, PlayerBundle, PlayerControlled, PlayerLives, Roster},
    motion::{Position, Velocity},
};

/// The overall state of a session.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum GameStage {
    /// Actors move and interact.
    #[default]
    Playing,
    /// The player was caught; everything is frozen until the sequence ends.
    PlayerDying {
        /// Ticks left in the death sequence.
        remaining_ticks: u32,
    },
    /// No lives remain.
    GameOver,
    /// Every pellet has been eaten.
    Cleared,
}

impl GameStage {
    /// Terminal stages never change again without a restart.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameStage::GameOver | GameStage::Cleared)
    }

    pub fn is_dying(&self) -> bool {
        matches!(self, GameStage::PlayerDying { .. })
    }
}

/// Replaces the player and the regular ghosts with fresh ones.
///
/// Bosses survive: they are moved to a fixed tile and calmed.
pub fn respawn_actors<'a>(
    commands: &mut Commands,
    roster: &Roster,
    rng: &mut GameRng,
    players: impl Iterator<Item = Entity>,
    ghosts: impl Iterator<Item = (Entity, &'a mut Ghost, &'a mut Position, &'a mut Velocity)>,
) {
    for entity in players {
        commands.entity(entity).despawn();
    }
    commands.spawn(PlayerBundle::default());

    let mut kept = 0;
    for (entity, ghost, position, velocity) in ghosts {
        if ghost.is_boss() {
            *position = Position::at_tile(RESTART_TILE);
            ghost.calm(velocity);
            kept += 1;
        } else {
            commands.entity(entity).despawn();
        }
    }

    for (index, personality) in roster.0.iter().enumerate() {
        commands.spawn(GhostBundle::regular(index, *personality, &mut rng.0));
    }
    debug!(ghosts = roster.0.len(), bosses = kept, "Actors respawned");
}

/// Plays out the death sequence, then either respawns the actors or ends the game.
#[allow(clippy::too_many_arguments)]
pub fn death_sequence_system(
    mut commands: Commands,
    mut stage: ResMut<GameStage>,
    mut lives: ResMut<PlayerLives>,
    mut rng: ResMut<GameRng>,
    roster: Res<Roster>,
    mut events: EventWriter<GameEvent>,
    players: Query<Entity, With<PlayerControlled>>,
    mut ghosts: Query<(Entity, &mut Ghost, &mut Position, &mut Velocity), Without<PlayerControlled>>,
) {
    let GameStage::PlayerDying { remaining_ticks } = &mut *stage else {
        return;
    };
    *remaining_ticks = remaining_ticks.saturating_sub(1);
    if *remaining_ticks > 0 {
        return;
    }

    lives.0 = lives.0.saturating_sub(1);
    events.write(GameEvent::LifeLost { remaining: lives.0 });
    if lives.0 == 0 {
        info!("Game over");
        *stage = GameStage::GameOver;
        events.write(GameEvent::GameOver);
        return;
    }

    info!(lives = lives.0, "Life lost, respawning");
    respawn_actors(
        &mut commands,
        &roster,
        &mut rng,
        players.iter(),
        ghosts.iter_mut().map(|(entity, ghost, position, velocity)| {
            (entity, ghost.into_inner(), position.into_inner(), velocity.into_inner())
        }),
    );
    *stage = GameStage::Playing;
}

/// Ends the level once no food remains.
pub fn clear_check_system(maze: Res<Maze>, mut stage: ResMut<GameStage>, mut events: EventWriter<GameEvent>) {
    if *stage == GameStage::Playing && maze.is_fully_cleared() {
        info!("Maze cleared");
        *stage = GameStage::Cleared;
        events.write(GameEvent::LevelCleared);
    }
}
