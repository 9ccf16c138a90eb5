//! This module contains the session: the world that holds all game state and the schedule
//! that advances it one tick at a time.

use bevy_ecs::event::{EventRegistry, Events};
use bevy_ecs::prelude::*;
use bevy_ecs::schedule::{IntoScheduleConfigs, Schedule, SystemSet};
use glam::{IVec2, Vec2};
use tracing::{debug, info, warn};

use crate::config::{GameConfig, DEFAULT_ROSTER};
use crate::constants::{boss::RESTART_TILE, PLAYER_SPAWN_TILE};
use crate::error::{GameError, GameResult};
use crate::events::GameEvent;
use crate::formatter;
use crate::map::{direction::Direction, grid::Maze};
use crate::systems::{
    boss_schedule_system, clear_check_system, death_sequence_system, eat_system, encounter_system,
    ghost_movement_system, player_movement_system, power_timer_system, roam_rotation_system, shield_tick_system,
    BossSchedule, GameRng, GameStage, Ghost, GhostBundle, Personality, PlayerBundle, PlayerControlled, PlayerLives,
    Position, PowerMode, RequestedDirection, Roster, ScoreResource, ShieldFlags, Shields, Velocity,
};

/// Ordering of the per-tick systems.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
enum TickSet {
    /// Runs only while the death sequence plays.
    Respond,
    /// Runs only while playing.
    Update,
}

/// What the presentation layer sees of the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerView {
    pub position: Vec2,
    pub tile: IVec2,
    pub direction: Option<Direction>,
    pub shields: ShieldFlags,
}

/// What the presentation layer sees of a ghost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostView {
    pub personality: Personality,
    pub position: Vec2,
    pub tile: IVec2,
    pub direction: Option<Direction>,
    pub scared: bool,
    pub boss: bool,
}

/// A read-only picture of the session, taken between ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub player: Option<PlayerView>,
    pub ghosts: Vec<GhostView>,
    pub score: u32,
    pub lives: u8,
    pub power: PowerMode,
    pub stage: GameStage,
    pub boss_warning: bool,
    pub food_left: usize,
}

/// A single game: the maze, every actor, and the rules that move them.
pub struct Session {
    world: World,
    schedule: Schedule,
    starting_lives: u8,
}

impl Session {
    /// Starts a session on the built-in board.
    pub fn new(config: &GameConfig) -> GameResult<Session> {
        Self::with_maze(Maze::classic()?, config)
    }

    /// Starts a session on a custom maze.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidState` if the player's spawn tile is not open, if ghosts are
    /// requested and a ghost spawn tile is not open, or if bosses are enabled and their
    /// restart tile is not open.
    pub fn with_maze(maze: Maze, config: &GameConfig) -> GameResult<Session> {
        if !maze.is_passable(PLAYER_SPAWN_TILE) {
            return Err(GameError::InvalidState(format!(
                "player spawn tile {PLAYER_SPAWN_TILE} is not passable"
            )));
        }
        check_ghost_spawns(&maze, config.ghost_count)?;
        if config.boss_enabled && !maze.is_passable(RESTART_TILE) {
            return Err(GameError::InvalidState(format!(
                "boss restart tile {RESTART_TILE} is not passable"
            )));
        }

        let mut world = World::default();
        let mut schedule = Schedule::default();

        Self::setup_ecs(&mut world);
        Self::insert_resources(&mut world, maze, config);
        Self::configure_schedule(&mut schedule);

        let mut session = Session {
            world,
            schedule,
            starting_lives: config.lives,
        };
        session.create_player();
        session.create_ghosts(config.ghost_count, &config.personalities())?;

        info!(
            ghosts = config.ghost_count,
            lives = config.lives,
            seed = ?config.seed,
            boss = config.boss_enabled,
            "Session created"
        );
        Ok(session)
    }

    fn setup_ecs(world: &mut World) {
        EventRegistry::register_event::<GameEvent>(world);
    }

    fn insert_resources(world: &mut World, maze: Maze, config: &GameConfig) {
        world.insert_resource(maze);
        world.insert_resource(ScoreResource(0));
        world.insert_resource(PlayerLives(config.lives));
        world.insert_resource(PowerMode::default());
        world.insert_resource(GameStage::default());
        world.insert_resource(BossSchedule::new(config.boss_enabled));
        world.insert_resource(GameRng::new(config.seed));
        world.insert_resource(Roster::default());
    }

    fn configure_schedule(schedule: &mut Schedule) {
        schedule
            .add_systems((
                death_sequence_system.in_set(TickSet::Respond),
                (
                    power_timer_system,
                    boss_schedule_system,
                    player_movement_system,
                    eat_system,
                    roam_rotation_system,
                    ghost_movement_system,
                    shield_tick_system,
                    encounter_system,
                    clear_check_system,
                )
                    .chain()
                    .in_set(TickSet::Update),
            ))
            .configure_sets((
                TickSet::Respond.run_if(|stage: Res<GameStage>| stage.is_dying()),
                TickSet::Update
                    .after(TickSet::Respond)
                    .run_if(|stage: Res<GameStage>| *stage == GameStage::Playing),
            ));
    }

    /// Advances the session by one tick and returns the resulting stage.
    ///
    /// Once the game is over or the maze is cleared, ticking does nothing until [`Session::restart`].
    pub fn tick(&mut self) -> GameStage {
        let stage = self.stage();
        if stage.is_terminal() {
            return stage;
        }

        self.world.resource_mut::<Events<GameEvent>>().update();
        self.schedule.run(&mut self.world);
        formatter::increment_tick();
        self.stage()
    }

    /// Replaces the player with a fresh one on the spawn tile.
    pub fn create_player(&mut self) -> Entity {
        let existing: Vec<Entity> = self
            .world
            .query_filtered::<Entity, With<PlayerControlled>>()
            .iter(&self.world)
            .collect();
        for entity in existing {
            self.world.despawn(entity);
        }
        self.world.spawn(PlayerBundle::default()).id()
    }

    /// Replaces every regular ghost with `count` new ones, cycling through `personalities`.
    ///
    /// An empty list uses the default roster. Bosses are left alone; a boss requested here
    /// becomes a direct chaser instead.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidState`, leaving the current ghosts in place, if a spawn tile
    /// the new ghosts would need is not open.
    pub fn create_ghosts(&mut self, count: usize, personalities: &[Personality]) -> GameResult<()> {
        check_ghost_spawns(self.maze(), count)?;
        let cycle = if personalities.is_empty() {
            &DEFAULT_ROSTER[..]
        } else {
            personalities
        };
        let roster: Vec<Personality> = (0..count)
            .map(|i| match cycle[i % cycle.len()] {
                Personality::Boss => {
                    warn!(index = i, "Bosses cannot be created as regular ghosts");
                    Personality::Direct
                }
                personality => personality,
            })
            .collect();

        let regular: Vec<Entity> = self
            .world
            .query::<(Entity, &Ghost)>()
            .iter(&self.world)
            .filter(|(_, ghost)| !ghost.is_boss())
            .map(|(entity, _)| entity)
            .collect();
        for entity in regular {
            self.world.despawn(entity);
        }

        self.world.resource_scope(|world, mut rng: Mut<GameRng>| {
            for (index, personality) in roster.iter().enumerate() {
                world.spawn(GhostBundle::regular(index, *personality, &mut rng.0));
            }
        });
        debug!(count = roster.len(), "Ghosts created");
        self.world.insert_resource(Roster(roster));
        Ok(())
    }

    /// Puts every pellet back.
    pub fn reset_maze(&mut self) {
        self.world.resource_mut::<Maze>().reset();
    }

    pub fn is_fully_cleared(&self) -> bool {
        self.maze().is_fully_cleared()
    }

    pub fn lives_exhausted(&self) -> bool {
        self.lives() == 0
    }

    /// Buffers the direction the player should take next.
    pub fn request_direction(&mut self, direction: Direction) {
        let mut query = self.world.query_filtered::<&mut RequestedDirection, With<PlayerControlled>>();
        for mut requested in query.iter_mut(&mut self.world) {
            requested.0 = Some(direction);
        }
    }

    /// Hides the player from ghosts if the ability is off cooldown. Returns whether it started.
    pub fn request_hide(&mut self) -> bool {
        let mut query = self.world.query_filtered::<&mut Shields, With<PlayerControlled>>();
        let started = query.iter_mut(&mut self.world).any(|mut shields| shields.try_hide());
        if started {
            debug!("Player hiding");
            self.world.send_event(GameEvent::HideStarted);
        }
        started
    }

    /// Starts over: full lives, zero score, a fresh maze and fresh actors. Bosses are removed.
    pub fn restart(&mut self) -> GameResult<()> {
        let ghosts: Vec<Entity> = self
            .world
            .query_filtered::<Entity, With<Ghost>>()
            .iter(&self.world)
            .collect();
        for entity in ghosts {
            self.world.despawn(entity);
        }

        let enabled = self.world.resource::<BossSchedule>().enabled;
        self.world.insert_resource(BossSchedule::new(enabled));
        self.world.insert_resource(ScoreResource(0));
        self.world.insert_resource(PlayerLives(self.starting_lives));
        self.world.insert_resource(PowerMode::default());
        self.world.insert_resource(GameStage::default());
        self.world.resource_mut::<Events<GameEvent>>().clear();
        self.reset_maze();

        let roster = self.world.resource::<Roster>().0.clone();
        self.create_player();
        self.create_ghosts(roster.len(), &roster)?;
        info!("Session restarted");
        Ok(())
    }

    /// Takes every event produced since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.world.resource_mut::<Events<GameEvent>>().drain().collect()
    }

    pub fn snapshot(&mut self) -> Snapshot {
        let player = self
            .world
            .query_filtered::<(&Position, &Velocity, &Shields), With<PlayerControlled>>()
            .iter(&self.world)
            .next()
            .map(|(position, velocity, shields)| PlayerView {
                position: position.0,
                tile: position.tile(),
                direction: velocity.direction,
                shields: shields.active(),
            });

        let ghosts = self
            .world
            .query::<(&Ghost, &Position, &Velocity)>()
            .iter(&self.world)
            .map(|(ghost, position, velocity)| GhostView {
                personality: ghost.personality,
                position: position.0,
                tile: position.tile(),
                direction: velocity.direction,
                scared: ghost.scared,
                boss: ghost.is_boss(),
            })
            .collect();

        Snapshot {
            player,
            ghosts,
            score: self.score(),
            lives: self.lives(),
            power: self.power_mode(),
            stage: self.stage(),
            boss_warning: self.world.resource::<BossSchedule>().is_warning(),
            food_left: self.maze().remaining_food(),
        }
    }

    pub fn maze(&self) -> &Maze {
        self.world.resource::<Maze>()
    }

    pub fn stage(&self) -> GameStage {
        *self.world.resource::<GameStage>()
    }

    pub fn score(&self) -> u32 {
        self.world.resource::<ScoreResource>().0
    }

    pub fn lives(&self) -> u8 {
        self.world.resource::<PlayerLives>().0
    }

    pub fn power_mode(&self) -> PowerMode {
        *self.world.resource::<PowerMode>()
    }

    /// Direct world access, for scripted scenarios.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

/// Fails unless every tile the first `count` roster ghosts spawn on is open.
fn check_ghost_spawns(maze: &Maze, count: usize) -> GameResult<()> {
    for index in 0..count.min(2) {
        let tile = GhostBundle::spawn_tile(index);
        if !maze.is_passable(tile) {
            return Err(GameError::InvalidState(format!("ghost spawn tile {tile} is not passable")));
        }
    }
    Ok(())
}
