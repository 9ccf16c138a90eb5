use figment::{providers::Env, Figment};
use serde::Deserialize;
use tracing::warn;

use crate::constants::{DEFAULT_GHOST_COUNT, STARTING_LIVES};
use crate::error::ConfigError;
use crate::systems::targeting::Personality;

/// The roster cycled through when no explicit roster is configured.
pub const DEFAULT_ROSTER: [Personality; 4] = [
    Personality::Direct,
    Personality::Ambush,
    Personality::Erratic,
    Personality::Shy,
];

/// Runtime configuration for a session.
///
/// Every field has a default, so an empty environment yields the classic setup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of regular ghosts spawned per life
    pub ghost_count: usize,
    /// Comma separated personality names, cycled over `ghost_count` ghosts
    pub roster: Option<String>,
    /// Lives at the start of a session
    pub lives: u8,
    /// Seed for the session RNG; entropy from the OS when absent
    pub seed: Option<u64>,
    /// Stop the headless runner after this many ticks
    pub ticks: Option<u64>,
    /// Whether the boss scheduler runs
    pub boss_enabled: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            ghost_count: DEFAULT_GHOST_COUNT,
            roster: None,
            lives: STARTING_LIVES,
            seed: None,
            ticks: None,
            boss_enabled: true,
        }
    }
}

impl GameConfig {
    /// Loads configuration from `PACMAN_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Figment::new().merge(Env::prefixed("PACMAN_")))
    }

    /// Extracts and validates configuration from any figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: GameConfig = figment.extract()?;
        if config.lives == 0 {
            return Err(ConfigError::Invalid("lives must be at least 1".to_string()));
        }
        Ok(config)
    }

    /// The personality of every regular ghost, in roster order.
    ///
    /// Unknown names fall back to [`Personality::Direct`]; the boss is never part of a roster.
    pub fn personalities(&self) -> Vec<Personality> {
        let cycle: Vec<Personality> = match &self.roster {
            Some(roster) => roster
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(|name| {
                    let personality = Personality::from_name(name);
                    if personality == Personality::Boss {
                        warn!(name, "Boss cannot be rostered, using direct chase instead");
                        Personality::Direct
                    } else {
                        personality
                    }
                })
                .collect(),
            None => DEFAULT_ROSTER.to_vec(),
        };

        if cycle.is_empty() {
            return Vec::new();
        }
        (0..self.ghost_count).map(|i| cycle[i % cycle.len()]).collect()
    }
}
