//! One-ply greedy engine.
//!
//! Takes a finding shift when one exists; otherwise picks the shift and
//! destination that carry the token farthest from where it stands.

use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;

use crate::engines::engine_trait::{engine_rng, Engine, EngineOutput};
use crate::game_state::board_state::BoardState;
use crate::game_state::maze_types::MoveAction;
use crate::move_generation::reachability::reachable_from_player;
use crate::move_generation::shift_generator::{generate_shifted_boards, ShiftedBoard};
use crate::search::board_scoring::farthest_from;
use crate::search::move_search::reaches_target;

pub struct GreedyEngine {
    rng: StdRng,
}

impl GreedyEngine {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: engine_rng(seed),
        }
    }
}

impl Default for GreedyEngine {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Engine for GreedyEngine {
    fn name(&self) -> &str {
        "Labyrinth Greedy"
    }

    fn choose_move(&mut self, board: &BoardState) -> Result<EngineOutput, String> {
        board.validate().map_err(|e| e.to_string())?;
        let me = board.player_id;
        let shifted = generate_shifted_boards(board, board.forbidden_slot);

        let mut out = EngineOutput::default();
        out.info_lines.push(format!(
            "info greedy_engine candidates {}",
            shifted.len()
        ));

        let finders: Vec<&ShiftedBoard> = shifted.iter().filter(|s| reaches_target(s)).collect();
        if let Some(chosen) = finders.choose(&mut self.rng) {
            if let Some(destination) = chosen.board.target_position() {
                out.info_lines
                    .push(format!("info greedy_engine finders {}", finders.len()));
                out.action = Some(MoveAction {
                    destination,
                    shift: chosen.candidate,
                });
                return Ok(out);
            }
        }

        let mut best: Option<(f64, MoveAction)> = None;
        for s in &shifted {
            let Some(origin) = s.board.player_position(me) else {
                continue;
            };
            let reach = reachable_from_player(&s.board, me);
            let destination = farthest_from(reach, origin).unwrap_or(origin);
            let distance = destination.euclidean_distance(origin);
            if best.map_or(true, |(d, _)| distance > d) {
                best = Some((
                    distance,
                    MoveAction {
                        destination,
                        shift: s.candidate,
                    },
                ));
            }
        }

        out.action = best.map(|(_, action)| action);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::maze_types::{Position, Treasure};
    use crate::utils::maze_notation::BoardBuilder;

    #[test]
    fn greedy_walks_to_the_far_end_of_a_corridor() {
        let layout = "0000000/0000000/0000000/5555555/0000000/0000000/0000000";
        let board = BoardBuilder::from_layout(layout)
            .expect("layout should parse")
            .spare(crate::game_state::maze_types::Openings::empty(), Some(Treasure::Sym01))
            .target(Treasure::Sym01)
            .player(1, Position::new(3, 1))
            .build()
            .expect("board should build");
        let mut engine = GreedyEngine::new(Some(3));
        let action = engine
            .choose_move(&board)
            .expect("engine should move")
            .action
            .expect("engine should pick an action");
        // Any shift that keeps row 3 intact lets the token walk to (3,6).
        assert_eq!(action.destination, Position::new(3, 6));
    }
}
