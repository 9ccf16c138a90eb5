use bevy_ecs::query::With;
use glam::{IVec2, Vec2};
use pacman_arcade::config::GameConfig;
use pacman_arcade::constants::{
    boss::{GRACE_TICKS, RESTART_TILE, SPAWN_INTERVAL, WARNING_TICKS},
    hide, DEATH_SEQUENCE_TICKS, DEFAULT_GHOST_COUNT, GHOST_SPAWN_TILE, PLAYER_SPAWN_TILE, STARTING_LIVES,
};
use pacman_arcade::error::GameError;
use pacman_arcade::events::GameEvent;
use pacman_arcade::game::Session;
use pacman_arcade::map::{direction::Direction, grid::Maze};
use pacman_arcade::systems::{
    motion::collides, BossBundle, Body, GameStage, Ghost, GhostBundle, Personality, PlayerControlled, Position, PowerMode,
    ShieldFlags, Shields, Velocity,
};
use pretty_assertions::assert_eq;
use rand::{rngs::SmallRng, SeedableRng};
use speculoos::prelude::*;

mod common;

fn quiet_config() -> GameConfig {
    GameConfig {
        ghost_count: 0,
        boss_enabled: false,
        seed: Some(3),
        ..GameConfig::default()
    }
}

/// Drops a motionless direct chaser onto the player's tile.
fn ambush_player(session: &mut Session) {
    let tile = session.snapshot().player.map(|player| player.tile).unwrap();
    let mut rng = SmallRng::seed_from_u64(0);
    let mut bundle = GhostBundle::regular(0, Personality::Direct, &mut rng);
    bundle.position = Position::at_tile(tile);
    bundle.velocity.direction = None;
    session.world_mut().spawn(bundle);
}

/// Gets the player caught and plays the death sequence out.
fn lose_a_life(session: &mut Session) -> Vec<GameEvent> {
    ambush_player(session);
    assert_eq!(
        session.tick(),
        GameStage::PlayerDying {
            remaining_ticks: DEATH_SEQUENCE_TICKS
        }
    );
    assert_that(&session.drain_events().contains(&GameEvent::PlayerCaught)).is_true();

    for _ in 1..DEATH_SEQUENCE_TICKS {
        assert_that(&session.tick().is_dying()).is_true();
    }
    session.drain_events();
    session.tick();
    session.drain_events()
}

#[test]
fn test_new_session_defaults() {
    let mut session = Session::new(&GameConfig {
        seed: Some(1),
        ..GameConfig::default()
    })
    .unwrap();
    let snapshot = session.snapshot();

    assert_that(&snapshot.ghosts.len()).is_equal_to(DEFAULT_GHOST_COUNT);
    assert_that(&snapshot.ghosts.iter().any(|ghost| ghost.boss)).is_false();
    assert_that(&snapshot.lives).is_equal_to(STARTING_LIVES);
    assert_that(&snapshot.score).is_equal_to(0);
    assert_that(&snapshot.stage).is_equal_to(GameStage::Playing);
    assert_that(&snapshot.power).is_equal_to(PowerMode::Inactive);
    assert_that(&snapshot.player.map(|player| player.tile)).is_equal_to(Some(PLAYER_SPAWN_TILE));
    assert_that(&snapshot.food_left).is_equal_to(Maze::classic().unwrap().remaining_food());

    let personalities: Vec<Personality> = {
        let world = session.world_mut();
        world.query::<&Ghost>().iter(world).map(|ghost| ghost.personality).collect()
    };
    for personality in [
        Personality::Direct,
        Personality::Ambush,
        Personality::Erratic,
        Personality::Shy,
    ] {
        assert_that(&personalities.contains(&personality)).is_true();
    }
}

#[test]
fn test_blocked_spawn_is_rejected() {
    let maze = Maze::from_rows(&["###", "###", "###"]).unwrap();
    let result = Session::with_maze(maze, &quiet_config());
    assert!(matches!(result, Err(GameError::InvalidState(_))));
}

#[test]
fn test_ghost_spawns_must_be_open() {
    let small = || common::open_maze(5, 5);

    // No ghosts and no bosses: only the player's tile matters
    assert_that(&Session::with_maze(small(), &quiet_config()).is_ok()).is_true();

    let with_ghosts = GameConfig {
        ghost_count: 2,
        ..quiet_config()
    };
    assert!(matches!(
        Session::with_maze(small(), &with_ghosts),
        Err(GameError::InvalidState(_))
    ));

    let with_bosses = GameConfig {
        boss_enabled: true,
        ..quiet_config()
    };
    assert!(matches!(
        Session::with_maze(small(), &with_bosses),
        Err(GameError::InvalidState(_))
    ));

    let mut session = Session::with_maze(small(), &quiet_config()).unwrap();
    assert!(matches!(
        session.create_ghosts(1, &[]),
        Err(GameError::InvalidState(_))
    ));
    assert_that(&session.snapshot().ghosts.is_empty()).is_true();
}

#[test]
fn test_ghosts_stay_inside_a_custom_maze() {
    // Big enough for both spawn tiles, walled all around
    let mut rows = vec!["#".repeat(14)];
    rows.extend((0..12).map(|_| format!("#{}#", "_".repeat(12))));
    rows.push("#".repeat(14));
    let maze = Maze::from_rows(&rows).unwrap();
    let mut session = Session::with_maze(
        maze,
        &GameConfig {
            ghost_count: 4,
            ..quiet_config()
        },
    )
    .unwrap();
    assert_that(&session.maze().is_passable(GHOST_SPAWN_TILE + IVec2::ONE)).is_true();

    for _ in 0..60 {
        session.tick();
        let world = session.world_mut();
        let mut ghosts = world.query::<(&Ghost, &Position, &Body)>();
        let positions: Vec<_> = ghosts.iter(world).map(|(_, position, body)| (position.0, body.size)).collect();
        assert_that(&positions.len()).is_equal_to(4);
        for (position, size) in positions {
            assert!(!collides(position, size, session.maze()), "ghost overlapped a wall at {position}");
        }
    }
}

#[test]
fn test_create_ghosts_replaces_regulars() {
    let mut session = Session::new(&quiet_config()).unwrap();

    session.create_ghosts(3, &[Personality::Boss]).unwrap();
    let snapshot = session.snapshot();
    assert_that(&snapshot.ghosts.len()).is_equal_to(3);
    assert_that(&snapshot.ghosts.iter().all(|ghost| ghost.personality == Personality::Direct)).is_true();

    session.create_ghosts(5, &[]).unwrap();
    let snapshot = session.snapshot();
    assert_that(&snapshot.ghosts.len()).is_equal_to(5);
    let shy = snapshot.ghosts.iter().filter(|ghost| ghost.personality == Personality::Shy).count();
    assert_that(&shy).is_equal_to(1);
}

#[test]
fn test_clearing_the_maze_ends_the_level() {
    let maze = Maze::from_rows(&["#####", "#_._#", "#####"]).unwrap();
    let mut session = Session::with_maze(maze, &quiet_config()).unwrap();
    session.request_direction(Direction::Right);

    let mut ticks = 0;
    while session.tick() == GameStage::Playing {
        ticks += 1;
        assert_that(&ticks).is_less_than(20);
    }

    assert_that(&session.stage()).is_equal_to(GameStage::Cleared);
    assert_that(&session.is_fully_cleared()).is_true();
    assert_that(&session.score()).is_equal_to(1);
    let events = session.drain_events();
    assert_that(&events.contains(&GameEvent::PelletEaten)).is_true();
    assert_that(&events.contains(&GameEvent::LevelCleared)).is_true();

    // Terminal: further ticks change nothing
    let before = session.snapshot();
    session.request_direction(Direction::Left);
    assert_that(&session.tick()).is_equal_to(GameStage::Cleared);
    assert_eq!(session.snapshot(), before);
    assert_that(&session.drain_events().is_empty()).is_true();
}

#[test]
fn test_losing_every_life_ends_the_game() {
    let mut session = Session::new(&GameConfig {
        lives: 2,
        ..quiet_config()
    })
    .unwrap();

    let events = lose_a_life(&mut session);
    assert_eq!(events, vec![GameEvent::LifeLost { remaining: 1 }]);
    assert_that(&session.stage()).is_equal_to(GameStage::Playing);
    assert_that(&session.lives()).is_equal_to(1);
    let snapshot = session.snapshot();
    assert_that(&snapshot.ghosts.is_empty()).is_true();
    assert_that(&snapshot.player.map(|player| player.tile)).is_equal_to(Some(PLAYER_SPAWN_TILE));

    let events = lose_a_life(&mut session);
    assert_eq!(events, vec![GameEvent::LifeLost { remaining: 0 }, GameEvent::GameOver]);
    assert_that(&session.stage()).is_equal_to(GameStage::GameOver);
    assert_that(&session.lives_exhausted()).is_true();

    let before = session.snapshot();
    assert_that(&session.tick()).is_equal_to(GameStage::GameOver);
    assert_eq!(session.snapshot(), before);
}

#[test]
fn test_surviving_boss_is_moved_and_calmed() {
    let mut session = Session::new(&quiet_config()).unwrap();
    let mut rng = SmallRng::seed_from_u64(1);
    let mut boss = BossBundle::new(Position::at_tile(IVec2::new(19, 21)).0, &mut rng);
    boss.ghost.frighten(&mut boss.velocity, 0.6);
    session.world_mut().spawn(boss);

    lose_a_life(&mut session);
    assert_that(&session.stage()).is_equal_to(GameStage::Playing);

    let world = session.world_mut();
    let bosses: Vec<(Ghost, Vec2, Velocity)> = world
        .query::<(&Ghost, &Position, &Velocity)>()
        .iter(world)
        .filter(|(ghost, _, _)| ghost.is_boss())
        .map(|(ghost, position, velocity)| (*ghost, position.0, *velocity))
        .collect();
    assert_that(&bosses.len()).is_equal_to(1);

    let (ghost, position, velocity) = bosses[0];
    assert_that(&ghost.scared).is_false();
    assert_that(&ghost.saved_speed).is_none();
    assert_that(&velocity.speed).is_equal_to(Personality::Boss.speed());
    // At most one step away: the respawn tick may already move it
    let restart = Position::at_tile(RESTART_TILE).0;
    assert_that(&(position.distance(restart) <= Personality::Boss.speed() + 1e-3)).is_true();
}

#[test]
fn test_restart_restores_everything() {
    let mut session = Session::new(&GameConfig {
        ghost_count: 4,
        ..quiet_config()
    })
    .unwrap();
    session.request_direction(Direction::Right);
    for _ in 0..20 {
        session.tick();
    }
    assert_that(&session.score()).is_greater_than(0);

    let mut rng = SmallRng::seed_from_u64(1);
    session
        .world_mut()
        .spawn(BossBundle::new(Position::at_tile(IVec2::new(10, 4)).0, &mut rng));
    session.restart().unwrap();

    let snapshot = session.snapshot();
    assert_that(&snapshot.score).is_equal_to(0);
    assert_that(&snapshot.lives).is_equal_to(STARTING_LIVES);
    assert_that(&snapshot.stage).is_equal_to(GameStage::Playing);
    assert_that(&snapshot.ghosts.len()).is_equal_to(4);
    assert_that(&snapshot.ghosts.iter().any(|ghost| ghost.boss)).is_false();
    assert_that(&snapshot.food_left).is_equal_to(Maze::classic().unwrap().remaining_food());
    assert_that(&snapshot.player.map(|player| player.tile)).is_equal_to(Some(PLAYER_SPAWN_TILE));
    assert_that(&session.drain_events().is_empty()).is_true();
}

#[test]
fn test_hide_and_cooldown() {
    let mut session = Session::new(&quiet_config()).unwrap();

    assert_that(&session.request_hide()).is_true();
    assert_that(&session.request_hide()).is_false();
    assert_eq!(session.drain_events(), vec![GameEvent::HideStarted]);
    let shields = session.snapshot().player.map(|player| player.shields);
    assert_that(&shields).is_equal_to(Some(ShieldFlags::HIDDEN));

    for _ in 0..hide::DURATION_TICKS {
        session.tick();
    }
    let shields = session.snapshot().player.map(|player| player.shields);
    assert_that(&shields).is_equal_to(Some(ShieldFlags::empty()));
    assert_that(&session.request_hide()).is_false();

    for _ in hide::DURATION_TICKS..hide::COOLDOWN_TICKS {
        session.tick();
    }
    assert_that(&session.request_hide()).is_true();
}

#[test]
fn test_hidden_player_walks_through_ghosts() {
    let mut session = Session::new(&quiet_config()).unwrap();
    session.request_hide();
    ambush_player(&mut session);

    for _ in 1..hide::DURATION_TICKS {
        assert_that(&session.tick()).is_equal_to(GameStage::Playing);
    }
    assert_that(&session.tick().is_dying()).is_true();
}

#[test]
fn test_boss_warning_then_spawn() {
    let mut session = Session::new(&GameConfig {
        boss_enabled: true,
        ..quiet_config()
    })
    .unwrap();

    let mut warnings = Vec::new();
    let mut spawned_at = None;
    for tick in 1..=SPAWN_INTERVAL {
        session.tick();
        for event in session.drain_events() {
            match event {
                GameEvent::BossWarning => warnings.push(tick),
                GameEvent::BossSpawned { count } => {
                    assert_that(&count).is_equal_to(1);
                    spawned_at = Some(tick);
                }
                _ => {}
            }
        }
        if tick == SPAWN_INTERVAL - 1 {
            assert_that(&session.snapshot().boss_warning).is_true();
        }
    }

    assert_eq!(warnings, vec![SPAWN_INTERVAL - WARNING_TICKS]);
    assert_that(&spawned_at).is_equal_to(Some(SPAWN_INTERVAL));

    let snapshot = session.snapshot();
    assert_that(&snapshot.boss_warning).is_false();
    assert_that(&snapshot.ghosts.iter().filter(|ghost| ghost.boss).count()).is_equal_to(1);
    let player = snapshot.player.unwrap();
    assert_that(&player.shields).is_equal_to(ShieldFlags::GRACE);
    assert_that(&snapshot.stage).is_equal_to(GameStage::Playing);

    let world = session.world_mut();
    let shields = *world
        .query_filtered::<&Shields, With<PlayerControlled>>()
        .single(world)
        .unwrap();
    assert_that(&shields.grace_ticks).is_equal_to(GRACE_TICKS - 1);
}
