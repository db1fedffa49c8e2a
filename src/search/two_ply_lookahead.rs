//! Two-turn planning for when the target is out of reach this turn.
//!
//! Every candidate shift is combined with every reachable first destination;
//! from there the acting player's own next shifts are tried as if no opponent
//! moved in between. A chain counts when the second turn's reachable set holds
//! the target. Among counting chains, the one whose first step walks the
//! shortest Manhattan distance wins; ties go to enumeration order.

use log::debug;

use crate::game_state::board_state::BoardState;
use crate::game_state::maze_types::{MoveAction, ShiftCandidate};
use crate::move_generation::reachability::{reachable, reachable_from_player};
use crate::move_generation::shift_generator::{generate_shifted_boards, ShiftedBoard};
use crate::search::ply_arena::{PlyArena, PlyNode};

/// A first-turn action that sets up reaching the target next turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwoPlyPlan {
    pub action: MoveAction,
    /// Manhattan distance walked on the first turn.
    pub distance: u32,
    /// Boards examined across both plies.
    pub nodes_explored: usize,
}

/// Shortest possible first step; nothing can beat it.
const BEST_POSSIBLE_DISTANCE: u32 = 1;

pub fn plan_two_ply(candidates: &[&ShiftedBoard]) -> Option<TwoPlyPlan> {
    let mut arena = PlyArena::with_capacity(candidates.len() * 8);
    // Distance, leaf index and the second-turn shift of the best chain.
    let mut best: Option<(u32, usize, ShiftCandidate)> = None;
    let mut nodes_explored = 0usize;

    'candidates: for shifted in candidates {
        let board = &shifted.board;
        let me = board.player_id;
        let Some(origin) = board.player_position(me) else {
            continue;
        };

        for destination in reachable(board, origin).iter() {
            let distance = origin.manhattan_distance(destination);
            if best.is_some_and(|(d, _, _)| distance >= d) {
                continue;
            }
            let Ok(moved) = board.with_player_moved(me, destination) else {
                continue;
            };
            nodes_explored += 1;

            let Some(leaf) = first_finishing_shift(&moved, &mut nodes_explored) else {
                continue;
            };
            let root = arena.push(PlyNode {
                shift: shifted.candidate,
                board: moved,
                destination,
                parent: None,
            });
            let leaf_shift = leaf.shift;
            let leaf_index = arena.push(PlyNode {
                parent: Some(root),
                ..leaf
            });
            best = Some((distance, leaf_index, leaf_shift));

            if distance <= BEST_POSSIBLE_DISTANCE {
                break 'candidates;
            }
        }
    }

    let (distance, leaf_index, leaf_shift) = best?;
    let root = arena.root_of(leaf_index).and_then(|i| arena.get(i))?;
    debug!(
        "two-ply: {} boards, plan walks {} then reaches the target via {}",
        nodes_explored, distance, leaf_shift.slot
    );
    Some(TwoPlyPlan {
        action: root.action(),
        distance,
        nodes_explored,
    })
}

/// First second-turn shift (in enumeration order) after which the target is
/// reachable, as an unlinked node.
fn first_finishing_shift(board: &BoardState, nodes_explored: &mut usize) -> Option<PlyNode> {
    let me = board.player_id;
    for next in generate_shifted_boards(board, board.forbidden_slot) {
        *nodes_explored += 1;
        let Some(target) = next.board.target_position() else {
            continue;
        };
        if reachable_from_player(&next.board, me).contains(target) {
            return Some(PlyNode {
                shift: next.candidate,
                board: next.board,
                destination: target,
                parent: None,
            });
        }
    }
    None
}
