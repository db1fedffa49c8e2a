//! Full search engine: blocking filter, immediate finds, two-ply planning,
//! and closest-approach fallback, backed by a per-game treasure tracker.

use rand::rngs::StdRng;

use crate::engines::engine_trait::{engine_rng, Engine, EngineOutput};
use crate::game_state::board_state::BoardState;
use crate::move_generation::shift_generator::apply_shift;
use crate::search::move_search::{search_best_move, SearchConfig};
use crate::tracking::treasure_tracker::TreasureTracker;

pub struct SearchEngine {
    tracker: TreasureTracker,
    rng: StdRng,
    config: SearchConfig,
}

impl SearchEngine {
    pub fn new(config: SearchConfig, seed: Option<u64>) -> Self {
        Self {
            tracker: TreasureTracker::new(),
            rng: engine_rng(seed),
            config,
        }
    }

    pub fn tracker(&self) -> &TreasureTracker {
        &self.tracker
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(SearchConfig::default(), None)
    }
}

impl Engine for SearchEngine {
    fn name(&self) -> &str {
        "Labyrinth Search"
    }

    fn new_game(&mut self) {
        self.tracker.reset();
    }

    fn choose_move(&mut self, board: &BoardState) -> Result<EngineOutput, String> {
        let outcome = search_best_move(board, &mut self.tracker, &mut self.rng, self.config)
            .map_err(|e| e.to_string())?;

        // Any decision can leave the token on the target, e.g. a walled-in
        // fallback that stays on it.
        let after = apply_shift(board, outcome.action.shift).map_err(|e| e.to_string())?;
        if after.tile(outcome.action.destination).treasure == Some(board.treasure_target) {
            self.tracker.record_own_find(board);
        }

        let mut out = EngineOutput::default();
        out.info_lines.push(format!(
            "info search decision {:?} candidates {} nodes {}",
            outcome.kind, outcome.candidates_considered, outcome.nodes_explored
        ));
        if outcome.blocking_filter_applied {
            out.info_lines
                .push("info search blocking_filter applied".to_owned());
        }
        if self.tracker.unidentified_count() > 0 {
            out.info_lines.push(format!(
                "info search unidentified_finds {}",
                self.tracker.unidentified_count()
            ));
        }
        out.action = Some(outcome.action);
        Ok(out)
    }
}
