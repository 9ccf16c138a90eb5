use bevy_ecs::{
    query::{With, Without},
    system::{Query, Res, ResMut},
};
use tracing::trace;

use crate::map::{
    grid::Maze,
    pathing::{align_to_corridor, resolve},
};
use crate::systems::{
    components::{GameRng, Ghost, PlayerControlled},
    motion::{far_tile_of, probe, step, tile_of, Body, Position, Velocity},
    targeting::{choose_target, Quarry, RoamTarget},
};

/// Steers and moves every ghost one tick.
///
/// Each ghost picks a target, asks the resolver for the first step toward it, realigns that
/// step to the corridor it straddles, and only commits the turn if a probe shows it is legal.
/// Whatever direction survives is then taken with probe-and-revert.
pub fn ghost_movement_system(
    maze: Res<Maze>,
    mut rng: ResMut<GameRng>,
    players: Query<(&Position, &Velocity), With<PlayerControlled>>,
    mut ghosts: Query<(&Ghost, &RoamTarget, &mut Position, &Body, &mut Velocity), Without<PlayerControlled>>,
) {
    let Ok((player_position, player_velocity)) = players.single() else {
        return;
    };
    let quarry = Quarry {
        position: player_position.0,
        direction: player_velocity.direction,
    };

    for (ghost, roam, mut position, body, mut velocity) in ghosts.iter_mut() {
        let target = choose_target(
            ghost.personality,
            position.0,
            ghost.detection_range,
            roam,
            &quarry,
            &maze,
            &mut rng.0,
        );

        let near = tile_of(position.0);
        let far = far_tile_of(position.0, body.size);
        if let Some(resolved) = resolve(&maze, near, tile_of(target)) {
            let aligned = align_to_corridor(resolved, near, far);
            if probe(position.0, body.size, aligned, velocity.speed, &maze).is_some() {
                velocity.direction = Some(aligned);
            } else {
                trace!(
                    personality = ghost.personality.as_ref(),
                    direction = aligned.as_ref(),
                    "Turn blocked, keeping heading"
                );
            }
        }

        if let Some(direction) = velocity.direction {
            position.0 = step(position.0, body.size, direction, velocity.speed, &maze);
        }
    }
}
