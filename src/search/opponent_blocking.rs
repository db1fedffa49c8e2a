//! Keep an opponent one treasure from victory off its home tile.
//!
//! When exactly one opponent has a single treasure left (its home), every
//! candidate shift is checked against that opponent's complete next turn: all
//! of its own shifts from the candidate's spare and forbidden slot, then its
//! reachable set.

use log::debug;

use crate::game_state::board_state::BoardState;
use crate::game_state::maze_types::PlayerId;
use crate::move_generation::reachability::reachable_from_player;
use crate::move_generation::shift_generator::{generate_shifted_boards, ShiftedBoard};

/// The single opponent with one treasure to go, if there is exactly one.
pub fn blocking_opponent(board: &BoardState) -> Option<PlayerId> {
    let mut closing: Vec<PlayerId> = board
        .opponents()
        .filter(|p| board.remaining_treasures(*p) == Some(1))
        .collect();
    if closing.len() == 1 {
        closing.pop()
    } else {
        None
    }
}

/// Whether `opponent` can stand on its home tile after its next turn on
/// `board`. Already standing there counts as reaching it.
pub fn opponent_can_reach_home(board: &BoardState, opponent: PlayerId) -> bool {
    let Some(home) = board.home_position(opponent) else {
        return false;
    };
    if board.player_position(opponent) == Some(home) {
        return true;
    }

    generate_shifted_boards(board, board.forbidden_slot)
        .iter()
        .any(|next| {
            next.board.home_position(opponent).is_some_and(|home| {
                next.board.player_position(opponent) == Some(home)
                    || reachable_from_player(&next.board, opponent).contains(home)
            })
        })
}

/// Candidates after which `opponent` cannot get home. May be empty.
pub fn filter_blocking<'a>(
    boards: &[&'a ShiftedBoard],
    opponent: PlayerId,
) -> Vec<&'a ShiftedBoard> {
    boards
        .iter()
        .copied()
        .filter(|shifted| {
            let opens_home = opponent_can_reach_home(&shifted.board, opponent);
            if opens_home {
                debug!(
                    "blocking: shift {} rot {} lets player {opponent} home",
                    shifted.candidate.slot,
                    shifted.candidate.rotation.degrees()
                );
            }
            !opens_home
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::maze_types::{Position, Treasure};
    use crate::utils::maze_notation::BoardBuilder;

    #[test]
    fn only_a_unique_closing_opponent_is_blocked() {
        let builder = || {
            BoardBuilder::from_layout(&"fffffff/".repeat(7))
                .expect("layout should parse")
                .player(1, Position::new(3, 3))
                .player(2, Position::new(0, 6))
                .player(3, Position::new(6, 0))
        };
        let one = builder()
            .treasures_to_go(2, 1)
            .build()
            .expect("board should build");
        assert_eq!(blocking_opponent(&one), Some(2));

        let two = builder()
            .treasures_to_go(2, 1)
            .treasures_to_go(3, 1)
            .build()
            .expect("board should build");
        assert_eq!(blocking_opponent(&two), None);

        let me_only = builder()
            .treasures_to_go(1, 1)
            .build()
            .expect("board should build");
        assert_eq!(blocking_opponent(&me_only), None);
    }

    #[test]
    fn walled_home_cannot_be_reached() {
        // Everything closed: nobody moves anywhere whatever gets shifted in,
        // since the spare is closed too.
        let board = BoardBuilder::from_layout(&"0000000/".repeat(7))
            .expect("layout should parse")
            .spare(crate::game_state::maze_types::Openings::empty(), None)
            .treasure(Treasure::Start02, Position::new(0, 6))
            .player(1, Position::new(3, 3))
            .player(2, Position::new(2, 4))
            .treasures_to_go(2, 1)
            .build()
            .expect("board should build");
        assert!(!opponent_can_reach_home(&board, 2));
    }

    #[test]
    fn standing_on_home_counts_as_reaching_it() {
        let board = BoardBuilder::from_layout(&"0000000/".repeat(7))
            .expect("layout should parse")
            .treasure(Treasure::Start02, Position::new(0, 6))
            .player(1, Position::new(3, 3))
            .player(2, Position::new(0, 6))
            .build()
            .expect("board should build");
        assert!(opponent_can_reach_home(&board, 2));
    }
}
