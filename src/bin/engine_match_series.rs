//! Standalone engine-vs-engine series runner.
//!
//! Run with:
//! `cargo run --release --bin engine_match_series`
//! `cargo run --release --bin engine_match_series -- --verbose`

use labyrinth_engine::engines::engine_greedy::GreedyEngine;
use labyrinth_engine::engines::engine_search::SearchEngine;
use labyrinth_engine::engines::engine_trait::Engine;
use labyrinth_engine::search::move_search::SearchConfig;
use labyrinth_engine::utils::match_harness::{
    play_match_series, EngineFactory, MatchConfig, MatchSeriesConfig,
};

fn main() -> Result<(), String> {
    let verbose = std::env::args().any(|a| a == "--verbose" || a == "-v");
    let filter = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    // Swap these to compare engines or search settings.
    let factories: Vec<EngineFactory> = vec![
        Box::new(|| Box::new(SearchEngine::new(SearchConfig::default(), None)) as Box<dyn Engine>),
        Box::new(|| Box::new(GreedyEngine::new(None)) as Box<dyn Engine>),
    ];

    let stats = play_match_series(
        &factories,
        &MatchSeriesConfig {
            games: 10,
            base_seed: 1234,
            per_game: MatchConfig {
                max_turns: 600,
                ..MatchConfig::default()
            },
        },
    )?;

    println!("{}", stats.report());
    println!("outcomes: {:?}", stats.outcomes);
    Ok(())
}
