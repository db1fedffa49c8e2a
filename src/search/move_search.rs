//! Per-turn move search.
//!
//! Runs the fixed decision pipeline for one turn:
//! refresh the treasure tracker, drop shifts that hand a closing opponent
//! the win, take the target now if any shift allows it, otherwise plan two
//! turns ahead, otherwise move as close to the target as possible.

use log::{debug, info, warn};
use rand::Rng;

use crate::game_state::board_state::BoardState;
use crate::game_state::maze_errors::{MazeError, MazeResult};
use crate::game_state::maze_types::MoveAction;
use crate::move_generation::reachability::reachable_from_player;
use crate::move_generation::shift_generator::{generate_shifted_boards, ShiftedBoard};
use crate::search::board_scoring::{fallback_destination, select_shift, ShiftFilter};
use crate::search::opponent_blocking::{blocking_opponent, filter_blocking};
use crate::search::two_ply_lookahead::plan_two_ply;
use crate::tracking::treasure_tracker::TreasureTracker;

const FINDER_FILTERS: [ShiftFilter; 2] = [
    ShiftFilter::MinimizeLeadingOpponentsReachableTreasures,
    ShiftFilter::MaximizeOwnReachableTreasures,
];

const FALLBACK_FILTERS: [ShiftFilter; 1] = [ShiftFilter::MinimizeLeadingOpponentsReachableTreasures];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    pub blocking_filter: bool,
    pub two_ply_lookahead: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            blocking_filter: true,
            two_ply_lookahead: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionKind {
    /// The target is reachable after the chosen shift.
    ImmediateFind,
    /// First half of a two-turn plan.
    TwoPlyPlan,
    /// Closest approach.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub action: MoveAction,
    pub kind: DecisionKind,
    pub candidates_considered: usize,
    pub blocking_filter_applied: bool,
    pub nodes_explored: usize,
}

/// True when the acting player can reach its target on this shifted board.
#[inline]
pub fn reaches_target(shifted: &ShiftedBoard) -> bool {
    let board = &shifted.board;
    board
        .target_position()
        .is_some_and(|target| reachable_from_player(board, board.player_id).contains(target))
}

pub fn search_best_move<R: Rng + ?Sized>(
    board: &BoardState,
    tracker: &mut TreasureTracker,
    rng: &mut R,
    config: SearchConfig,
) -> MazeResult<SearchOutcome> {
    board.validate()?;
    tracker.update(board);

    let me = board.player_id;
    let to_go = board.remaining_treasures(me);
    let all_shifts = generate_shifted_boards(board, board.forbidden_slot);
    let mut candidates: Vec<&ShiftedBoard> = all_shifts.iter().collect();

    let mut blocking_filter_applied = false;
    if config.blocking_filter {
        if let Some(opponent) = blocking_opponent(board) {
            let can_finish_now = to_go == Some(1) && candidates.iter().any(|s| reaches_target(s));
            if !can_finish_now {
                let filtered = filter_blocking(&candidates, opponent);
                if filtered.is_empty() {
                    warn!("every shift lets player {opponent} reach home; keeping all candidates");
                } else {
                    debug!(
                        "blocking player {opponent}: {} of {} shifts kept",
                        filtered.len(),
                        candidates.len()
                    );
                    candidates = filtered;
                    blocking_filter_applied = true;
                }
            }
        }
    }
    let candidates_considered = candidates.len();

    let mut finders: Vec<&ShiftedBoard> = candidates
        .iter()
        .copied()
        .filter(|s| reaches_target(s))
        .collect();
    if !finders.is_empty() {
        if to_go == Some(2) {
            finders = ShiftFilter::AlsoReachesHome.narrow(&finders);
        }
        let chosen = select_shift(&finders, &FINDER_FILTERS, rng)
            .ok_or_else(|| MazeError::InvalidPayload("no finding shift to choose".to_owned()))?;
        let destination = chosen
            .board
            .target_position()
            .ok_or(MazeError::UnreachableDestination(chosen.candidate.slot))?;
        let action = MoveAction {
            destination,
            shift: chosen.candidate,
        };
        info!("player {me}: {} reaches {}", action, board.treasure_target);
        return Ok(SearchOutcome {
            action,
            kind: DecisionKind::ImmediateFind,
            candidates_considered,
            blocking_filter_applied,
            nodes_explored: candidates_considered,
        });
    }

    if config.two_ply_lookahead {
        if let Some(plan) = plan_two_ply(&candidates) {
            info!(
                "player {me}: {} sets up {} next turn",
                plan.action, board.treasure_target
            );
            return Ok(SearchOutcome {
                action: plan.action,
                kind: DecisionKind::TwoPlyPlan,
                candidates_considered,
                blocking_filter_applied,
                nodes_explored: candidates_considered + plan.nodes_explored,
            });
        }
    }

    let chosen = select_shift(&candidates, &FALLBACK_FILTERS, rng)
        .ok_or_else(|| MazeError::InvalidPayload("no shift candidates".to_owned()))?;
    let destination =
        fallback_destination(&chosen.board, me).ok_or(MazeError::PlayerMissing(me))?;
    let action = MoveAction {
        destination,
        shift: chosen.candidate,
    };
    info!("player {me}: no route to {}, {}", board.treasure_target, action);
    Ok(SearchOutcome {
        action,
        kind: DecisionKind::Fallback,
        candidates_considered,
        blocking_filter_applied,
        nodes_explored: candidates_considered,
    })
}
