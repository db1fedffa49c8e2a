//! Random-move engine.
//!
//! Picks a uniformly random legal shift, then a uniformly random destination
//! among the token's reachable tiles (staying put included). Used for
//! diagnostics and as a sparring partner in the match harness.

use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;

use crate::engines::engine_trait::{engine_rng, Engine, EngineOutput};
use crate::game_state::board_state::BoardState;
use crate::game_state::maze_types::{MoveAction, Position};
use crate::move_generation::reachability::reachable_from_player;
use crate::move_generation::shift_generator::generate_shifted_boards;

pub struct RandomEngine {
    rng: StdRng,
}

impl RandomEngine {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: engine_rng(seed),
        }
    }
}

impl Default for RandomEngine {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Engine for RandomEngine {
    fn name(&self) -> &str {
        "Labyrinth Random"
    }

    fn choose_move(&mut self, board: &BoardState) -> Result<EngineOutput, String> {
        board.validate().map_err(|e| e.to_string())?;
        let shifted = generate_shifted_boards(board, board.forbidden_slot);

        let mut out = EngineOutput::default();
        out.info_lines.push(format!(
            "info random_engine candidates {}",
            shifted.len()
        ));

        let picked = shifted
            .choose(&mut self.rng)
            .ok_or("failed to choose a random shift")?;
        let me = board.player_id;
        let origin = picked
            .board
            .player_position(me)
            .ok_or_else(|| format!("player {me} lost its token"))?;
        let mut destinations: Vec<Position> =
            reachable_from_player(&picked.board, me).iter().collect();
        destinations.push(origin);
        let destination = *destinations
            .choose(&mut self.rng)
            .ok_or("failed to choose a random destination")?;

        out.action = Some(MoveAction {
            destination,
            shift: picked.candidate,
        });
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::move_generation::shift_generator::apply_shift;
    use crate::utils::maze_notation::BoardBuilder;

    #[test]
    fn random_moves_are_legal() {
        let board = BoardBuilder::from_layout("6ecaf35/9bd7e3c/5a6fc91/e3b5d7a/7c9e6bf/a5f3c9e/3d6ab59")
            .expect("layout should parse")
            .player(1, Position::new(2, 2))
            .forbidden(Position::new(3, 6))
            .build()
            .expect("board should build");
        let mut engine = RandomEngine::new(Some(42));
        for _ in 0..32 {
            let action = engine
                .choose_move(&board)
                .expect("engine should move")
                .action
                .expect("engine should pick an action");
            assert_ne!(action.shift.slot, Position::new(3, 6));
            let after = apply_shift(&board, action.shift).expect("shift should be legal");
            let origin = after.player_position(1).expect("token should survive the shift");
            assert!(
                action.destination == origin
                    || reachable_from_player(&after, 1).contains(action.destination)
            );
        }
    }
}
