#![allow(dead_code)]

use bevy_ecs::{
    entity::Entity,
    event::{EventRegistry, Events},
    world::World,
};
use glam::IVec2;
use pacman_arcade::{
    events::GameEvent,
    map::grid::Maze,
    systems::{
        BossSchedule, GameRng, GameStage, Ghost, GhostBundle, Personality, PlayerBundle, PlayerLives, Position, PowerMode,
        Roster, ScoreResource, Velocity,
    },
};
use rand::{rngs::SmallRng, SeedableRng};

/// A maze of open floor with no food, `columns` wide and `rows` tall.
pub fn open_maze(columns: usize, rows: usize) -> Maze {
    let row = "_".repeat(columns);
    let rows: Vec<String> = (0..rows).map(|_| row.clone()).collect();
    Maze::from_rows(&rows).unwrap()
}

/// A world with every resource the gameplay systems expect.
pub fn create_test_world(maze: Maze) -> World {
    let mut world = World::new();
    EventRegistry::register_event::<GameEvent>(&mut world);
    world.insert_resource(maze);
    world.insert_resource(ScoreResource(0));
    world.insert_resource(PlayerLives(3));
    world.insert_resource(PowerMode::default());
    world.insert_resource(GameStage::default());
    world.insert_resource(BossSchedule::new(false));
    world.insert_resource(GameRng::new(Some(7)));
    world.insert_resource(Roster::default());
    world
}

pub fn spawn_test_player(world: &mut World, tile: IVec2) -> Entity {
    world
        .spawn(PlayerBundle {
            position: Position::at_tile(tile),
            ..PlayerBundle::default()
        })
        .id()
}

pub fn spawn_test_ghost(world: &mut World, tile: IVec2, personality: Personality) -> Entity {
    let mut rng = SmallRng::seed_from_u64(0);
    let mut bundle = GhostBundle::regular(0, personality, &mut rng);
    bundle.position = Position::at_tile(tile);
    world.spawn(bundle).id()
}

pub fn drain_events(world: &mut World) -> Vec<GameEvent> {
    world.resource_mut::<Events<GameEvent>>().drain().collect()
}

pub fn ghost_state(world: &World, entity: Entity) -> (Ghost, Velocity) {
    (
        *world.get::<Ghost>(entity).unwrap(),
        *world.get::<Velocity>(entity).unwrap(),
    )
}
