use bevy_ecs::prelude::*;

/// Notable things that happened during a tick.
///
/// The core never draws or plays sounds; these are drained by whatever presents the game.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    PelletEaten,
    PowerPelletEaten,
    PowerModeEnded,
    GhostEaten { points: u32, boss: bool },
    PlayerCaught,
    LifeLost { remaining: u8 },
    BossWarning,
    BossSpawned { count: u32 },
    HideStarted,
    LevelCleared,
    GameOver,
}
