//! Labyrinth client: reads one JSON message per stdin line, answers turn
//! requests on stdout.
//!
//! Run with:
//! `cargo run --release -- [config.json]`

use std::path::PathBuf;

use labyrinth_engine::config::ClientConfig;
use labyrinth_engine::protocol::session::run_stdio_loop;
use log::info;

fn main() -> Result<(), String> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = ClientConfig::load(config_path.as_deref())?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .format_timestamp_micros()
    .target(env_logger::Target::Stderr)
    .init();

    let engine = config.build_engine();
    info!("starting {} with {:?}", engine.name(), config);
    run_stdio_loop(engine).map_err(|e| format!("session I/O failed: {e}"))
}
