//! Flood-fill reachability over the maze.
//!
//! Two neighbouring cells connect only when both tiles are open towards each
//! other. Visited cells are tracked in a 49-bit mask.

use crate::game_state::board_state::BoardState;
use crate::game_state::maze_rules::CELL_COUNT;
use crate::game_state::maze_types::{Direction, PlayerId, Position};

/// Cells reachable from a start cell, excluding the start itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ReachableSet(u64);

impl ReachableSet {
    pub const EMPTY: ReachableSet = ReachableSet(0);

    #[inline]
    pub fn contains(self, pos: Position) -> bool {
        pos.is_on_board() && self.0 & (1u64 << pos.index()) != 0
    }

    #[inline]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[cfg(test)]
    pub(crate) fn from_positions(positions: &[Position]) -> Self {
        ReachableSet(positions.iter().fold(0, |bits, pos| bits | (1u64 << pos.index())))
    }

    /// Row-major iteration.
    pub fn iter(self) -> impl Iterator<Item = Position> {
        (0..CELL_COUNT)
            .filter(move |i| self.0 & (1u64 << i) != 0)
            .map(Position::from_index)
    }
}

/// True when a token on `from` may step one cell towards `direction`.
#[inline]
pub fn can_step(board: &BoardState, from: Position, direction: Direction) -> bool {
    match from.step(direction) {
        Some(to) => {
            board.tile(from).is_open(direction) && board.tile(to).is_open(direction.opposite())
        }
        None => false,
    }
}

pub fn reachable(board: &BoardState, start: Position) -> ReachableSet {
    if !start.is_on_board() {
        return ReachableSet::EMPTY;
    }

    let mut visited = 1u64 << start.index();
    let mut stack = Vec::with_capacity(CELL_COUNT);
    stack.push(start);

    while let Some(pos) = stack.pop() {
        for direction in Direction::ALL {
            if !can_step(board, pos, direction) {
                continue;
            }
            let Some(next) = pos.step(direction) else {
                continue;
            };
            let bit = 1u64 << next.index();
            if visited & bit == 0 {
                visited |= bit;
                stack.push(next);
            }
        }
    }

    let mut set = ReachableSet(visited);
    set.0 &= !(1u64 << start.index());
    set
}

/// Reachable set from wherever `player` currently stands.
#[inline]
pub fn reachable_from_player(board: &BoardState, player: PlayerId) -> ReachableSet {
    board
        .player_position(player)
        .map(|pos| reachable(board, pos))
        .unwrap_or(ReachableSet::EMPTY)
}

/// Number of reachable tiles that hold any treasure; 0 when the player has no
/// token on the board.
pub fn reachable_treasure_count(board: &BoardState, player: PlayerId) -> usize {
    reachable_from_player(board, player)
        .iter()
        .filter(|pos| board.tile(*pos).treasure.is_some())
        .count()
}

/// Number of undirected edges whose two tiles are open towards each other.
pub fn open_path_count(board: &BoardState) -> usize {
    let mut count = 0;
    for index in 0..CELL_COUNT {
        let pos = Position::from_index(index);
        if can_step(board, pos, Direction::Right) {
            count += 1;
        }
        if can_step(board, pos, Direction::Bottom) {
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::maze_notation::BoardBuilder;

    // A straight horizontal corridor on row 3, everything else walled.
    const CORRIDOR: &str = "\
        0000000\n\
        0000000\n\
        0000000\n\
        5555555\n\
        0000000\n\
        0000000\n\
        0000000";

    #[test]
    fn corridor_is_reachable_end_to_end() {
        let board = BoardBuilder::from_layout(CORRIDOR)
            .expect("layout should parse")
            .player(1, Position::new(3, 0))
            .build()
            .expect("board should build");
        let set = reachable(&board, Position::new(3, 0));
        assert_eq!(set.len(), 6);
        assert!(set.contains(Position::new(3, 6)));
        assert!(!set.contains(Position::new(3, 0)));
        assert!(!set.contains(Position::new(2, 0)));
    }

    #[test]
    fn one_sided_openings_do_not_connect() {
        // (0,0) opens right, (0,1) is closed on the left.
        let layout = "4400000\n0000000\n0000000\n0000000\n0000000\n0000000\n0000000";
        let board = BoardBuilder::from_layout(layout)
            .expect("layout should parse")
            .player(1, Position::new(0, 0))
            .build()
            .expect("board should build");
        assert!(reachable(&board, Position::new(0, 0)).is_empty());
        assert!(!can_step(&board, Position::new(0, 0), Direction::Right));
    }

    #[test]
    fn reachability_is_symmetric() {
        let layout = "\
            6ecaf35\n\
            9bd7e3c\n\
            5a6fc91\n\
            e3b5d7a\n\
            7c9e6bf\n\
            a5f3c9e\n\
            3d6ab59";
        let board = BoardBuilder::from_layout(layout)
            .expect("layout should parse")
            .player(1, Position::new(0, 0))
            .build()
            .expect("board should build");
        for a in 0..CELL_COUNT {
            let from = Position::from_index(a);
            let reach = reachable(&board, from);
            for to in reach.iter() {
                assert!(
                    reachable(&board, to).contains(from),
                    "{from} reaches {to} but not the other way round"
                );
            }
        }
    }

    #[test]
    fn open_paths_of_a_fully_open_board() {
        let layout = "fffffff\n".repeat(7);
        let board = BoardBuilder::from_layout(layout.trim_end())
            .expect("layout should parse")
            .player(1, Position::new(0, 0))
            .build()
            .expect("board should build");
        assert_eq!(open_path_count(&board), 2 * 7 * 6);
        assert_eq!(reachable(&board, Position::new(3, 3)).len(), CELL_COUNT - 1);
    }

    #[test]
    fn treasure_count_ignores_walled_off_tiles() {
        let board = BoardBuilder::from_layout(CORRIDOR)
            .expect("layout should parse")
            .treasure(crate::game_state::maze_types::Treasure::Sym01, Position::new(3, 4))
            .treasure(crate::game_state::maze_types::Treasure::Sym02, Position::new(1, 1))
            .player(1, Position::new(3, 0))
            .build()
            .expect("board should build");
        assert_eq!(reachable_treasure_count(&board, 1), 1);
        assert_eq!(reachable_treasure_count(&board, 2), 0);
        assert_eq!(
            reachable(&board, Position::new(3, 5)),
            ReachableSet::from_positions(&[
                Position::new(3, 0),
                Position::new(3, 1),
                Position::new(3, 2),
                Position::new(3, 3),
                Position::new(3, 4),
                Position::new(3, 6),
            ])
        );
    }
}
