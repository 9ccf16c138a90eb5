use anyhow::Result;
use thousands::Separable;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

use pacman_arcade::app::{App, Autopilot};
use pacman_arcade::config::GameConfig;
use pacman_arcade::constants::LOOP_TIME;
use pacman_arcade::formatter::CustomFormatter;
use pacman_arcade::game::Session;

fn setup_logging() -> Result<()> {
    let subscriber = tracing_subscriber::registry()
        .with(fmt::layer().event_format(CustomFormatter))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(ErrorLayer::default());

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// The main entry point of the application.
///
/// Plays a headless attract-mode game until it ends or the configured tick limit is reached.
pub fn main() -> Result<()> {
    setup_logging()?;

    let config = GameConfig::load()?;
    let session = Session::new(&config)?;
    let mut app = App::new(session, Autopilot::new(config.seed), config.ticks);

    info!(loop_time = ?LOOP_TIME, "Starting game loop");

    loop {
        if !app.run() {
            break;
        }
    }

    let snapshot = app.snapshot();
    println!(
        "Final score: {} ({:?}, {} lives left)",
        snapshot.score.separate_with_commas(),
        snapshot.stage,
        snapshot.lives
    );
    Ok(())
}
