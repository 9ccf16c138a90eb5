use std::time::{Duration, Instant};

use rand::{rngs::SmallRng, Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::constants::{LOOP_TIME, TICK_RATE};
use crate::events::GameEvent;
use crate::game::{Session, Snapshot};
use crate::map::direction::Direction;

/// Ticks between autopilot direction changes.
const STEER_INTERVAL: u64 = 15;
/// Chance per steering decision that the autopilot also tries to hide.
const HIDE_CHANCE: f64 = 0.05;

/// Stands in for the input layer: steers the player at random.
pub struct Autopilot {
    rng: SmallRng,
}

impl Autopilot {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(1)),
            None => SmallRng::from_os_rng(),
        };
        Self { rng }
    }

    /// Feeds the session its input for tick `tick`.
    pub fn drive(&mut self, session: &mut Session, tick: u64) {
        if tick % STEER_INTERVAL != 0 {
            return;
        }
        let direction = Direction::DIRECTIONS[self.rng.random_range(0..Direction::DIRECTIONS.len())];
        session.request_direction(direction);
        if self.rng.random_bool(HIDE_CHANCE) {
            session.request_hide();
        }
    }
}

/// Runs a session at a fixed rate until it ends or the tick limit is reached.
pub struct App {
    session: Session,
    autopilot: Autopilot,
    max_ticks: Option<u64>,
    ticks: u64,
}

impl App {
    pub fn new(session: Session, autopilot: Autopilot, max_ticks: Option<u64>) -> Self {
        Self {
            session,
            autopilot,
            max_ticks,
            ticks: 0,
        }
    }

    /// Runs one update followed by one draw. Returns false once the loop should stop.
    pub fn run(&mut self) -> bool {
        let start = Instant::now();

        self.autopilot.drive(&mut self.session, self.ticks);
        let stage = self.session.tick();
        self.ticks += 1;
        self.draw();

        if stage.is_terminal() {
            info!(stage = ?stage, ticks = self.ticks, "Session ended");
            return false;
        }
        if self.max_ticks.is_some_and(|limit| self.ticks >= limit) {
            info!(ticks = self.ticks, "Tick limit reached");
            return false;
        }

        if start.elapsed() < LOOP_TIME {
            let time = LOOP_TIME.saturating_sub(start.elapsed());
            if time != Duration::ZERO {
                spin_sleep::sleep(time);
            }
        } else {
            warn!(behind = ?(start.elapsed() - LOOP_TIME), "Game loop behind schedule");
        }

        true
    }

    /// The headless "draw": reports events and a summary once a second.
    fn draw(&mut self) {
        for event in self.session.drain_events() {
            match event {
                GameEvent::PelletEaten => {}
                GameEvent::GhostEaten { points, boss } => info!(points, boss, "Ghost eaten"),
                GameEvent::LifeLost { remaining } => info!(remaining, "Life lost"),
                other => debug!(event = ?other, "Game event"),
            }
        }

        if self.ticks % u64::from(TICK_RATE) == 0 {
            let snapshot = self.session.snapshot();
            info!(
                score = snapshot.score,
                lives = snapshot.lives,
                food = snapshot.food_left,
                ghosts = snapshot.ghosts.len(),
                power = snapshot.power.remaining_ticks(),
                "Status"
            );
        }
    }

    pub fn snapshot(&mut self) -> Snapshot {
        self.session.snapshot()
    }
}
