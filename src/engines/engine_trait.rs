//! Engine abstraction layer used by the session loop and the match harness.
//!
//! Every strategy takes the turn's board and returns one action plus
//! human-readable diagnostic lines.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::game_state::board_state::BoardState;
use crate::game_state::maze_types::MoveAction;

#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    pub action: Option<MoveAction>,
    pub info_lines: Vec<String>,
}

pub trait Engine: Send {
    fn name(&self) -> &str;

    /// Drop any per-game state.
    fn new_game(&mut self) {}

    fn choose_move(&mut self, board: &BoardState) -> Result<EngineOutput, String>;
}

/// Seeded generator when a seed is given, OS entropy otherwise.
pub fn engine_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}
