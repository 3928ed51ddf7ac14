mod asteroid;
mod body;
mod game;
mod laser;
mod shield;
mod ship;

use anyhow::Context;
use nova_engine::logging::init_logging;
use nova_engine::{EngineConfig, Runtime};

use game::AsteroidsGame;

const CONFIG_PATH: &str = "nova.toml";

fn main() -> anyhow::Result<()> {
    let config = EngineConfig::load(CONFIG_PATH).with_context(|| format!("failed to load {CONFIG_PATH}"))?;
    init_logging(config.logging());
    log::info!("starting {:?} ({}x{})", config.window.title, config.window.width, config.window.height);

    Runtime::run(config, AsteroidsGame::new())
}
