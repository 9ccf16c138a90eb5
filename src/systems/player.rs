use bevy_ecs::{
    event::EventWriter,
    query::With,
    system::{Query, Res, ResMut},
};
use tracing::trace;

use crate::constants::score;
use crate::events::GameEvent;
use crate::map::grid::{Consumed, Maze};
use crate::systems::{
    components::{Ghost, PlayerControlled, RequestedDirection, ScoreResource, Shields},
    motion::{probe, step, Body, Position, Velocity},
    power::{activate_power_mode, PowerMode},
};

/// Turns toward the requested direction when the way is open, then moves.
///
/// A request that cannot be honored yet stays buffered and is retried every tick.
pub fn player_movement_system(
    maze: Res<Maze>,
    mut players: Query<(&mut Position, &Body, &mut Velocity, &RequestedDirection), With<PlayerControlled>>,
) {
    for (mut position, body, mut velocity, requested) in players.iter_mut() {
        if let Some(requested) = requested.0 {
            if velocity.direction != Some(requested)
                && probe(position.0, body.size, requested, velocity.speed, &maze).is_some()
            {
                trace!(from = ?velocity.direction, to = requested.as_ref(), "Player turned");
                velocity.direction = Some(requested);
            }
        }

        if let Some(direction) = velocity.direction {
            position.0 = step(position.0, body.size, direction, velocity.speed, &maze);
        }
    }
}

/// Eats whatever is under the player's top-left corner.
pub fn eat_system(
    mut maze: ResMut<Maze>,
    mut score: ResMut<ScoreResource>,
    mut power: ResMut<PowerMode>,
    mut events: EventWriter<GameEvent>,
    players: Query<&Position, With<PlayerControlled>>,
    mut ghosts: Query<(&mut Ghost, &mut Velocity)>,
) {
    for position in players.iter() {
        let tile = position.tile();
        match maze.consume(tile.y, tile.x) {
            Some(Consumed::Pellet) => {
                score.0 += score::PELLET;
                events.write(GameEvent::PelletEaten);
            }
            Some(Consumed::PowerPellet) => {
                score.0 += score::POWER_PELLET;
                activate_power_mode(
                    &mut power,
                    ghosts.iter_mut().map(|(ghost, velocity)| (ghost.into_inner(), velocity.into_inner())),
                );
                events.write(GameEvent::PowerPelletEaten);
            }
            None => {}
        }
    }
}

/// Counts the player's immunity timers down.
pub fn shield_tick_system(mut players: Query<&mut Shields, With<PlayerControlled>>) {
    for mut shields in players.iter_mut() {
        shields.tick();
    }
}
