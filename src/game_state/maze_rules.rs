//! Canonical maze-rule constants.
//!
//! This module stores the fixed geometry of the 7x7 board: the twelve legal
//! insertion slots, the home corners of each player, and the treasure budget
//! dealt at the start of a game.

use crate::game_state::maze_types::{PlayerId, Position};

/// Rows and columns of the board.
pub const BOARD_SIZE: usize = 7;

/// Index of the last row/column.
pub const LAST_INDEX: u8 = (BOARD_SIZE - 1) as u8;

pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// Player ids run from 1 to this value.
pub const MAX_PLAYERS: usize = 4;

/// Treasures other than the four home markers.
pub const SYMBOL_TREASURE_COUNT: usize = 24;

/// Insertion slots ordered by row, then column.
pub const SHIFT_SLOTS: [Position; 12] = [
    Position::new(0, 1),
    Position::new(0, 3),
    Position::new(0, 5),
    Position::new(1, 0),
    Position::new(1, LAST_INDEX),
    Position::new(3, 0),
    Position::new(3, LAST_INDEX),
    Position::new(5, 0),
    Position::new(5, LAST_INDEX),
    Position::new(LAST_INDEX, 1),
    Position::new(LAST_INDEX, 3),
    Position::new(LAST_INDEX, 5),
];

/// Four rotations per slot.
pub const MAX_SHIFT_CANDIDATES: usize = SHIFT_SLOTS.len() * 4;

/// Home corner of players 1..=4, in id order.
pub const HOME_CORNERS: [Position; MAX_PLAYERS] = [
    Position::new(0, 0),
    Position::new(0, LAST_INDEX),
    Position::new(LAST_INDEX, 0),
    Position::new(LAST_INDEX, LAST_INDEX),
];

#[inline]
pub fn is_valid_player_id(player: PlayerId) -> bool {
    (1..=MAX_PLAYERS as u8).contains(&player)
}

/// A border cell whose other coordinate is odd.
#[inline]
pub fn is_shift_slot(slot: Position) -> bool {
    let odd = |v: u8| v % 2 == 1 && v < LAST_INDEX;
    let border = |v: u8| v == 0 || v == LAST_INDEX;
    (border(slot.row) && odd(slot.col)) || (border(slot.col) && odd(slot.row))
}

/// The slot on the opposite border of the same row or column.
///
/// Inserting at a slot ejects the tile sitting on its mirror, and the mirror
/// becomes the next mover's forbidden slot.
#[inline]
pub fn mirror_slot(slot: Position) -> Position {
    if slot.col == 0 || slot.col == LAST_INDEX {
        Position::new(slot.row, LAST_INDEX - slot.col)
    } else {
        Position::new(LAST_INDEX - slot.row, slot.col)
    }
}

#[inline]
pub fn home_corner(player: PlayerId) -> Option<Position> {
    if is_valid_player_id(player) {
        Some(HOME_CORNERS[usize::from(player) - 1])
    } else {
        None
    }
}

/// Treasures each player must collect, including the final return home.
#[inline]
pub fn treasures_per_player(player_count: usize) -> u8 {
    let players = player_count.clamp(1, MAX_PLAYERS);
    (SYMBOL_TREASURE_COUNT / players + 1) as u8
}
