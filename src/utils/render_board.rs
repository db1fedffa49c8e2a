//! Terminal-oriented maze renderer.
//!
//! Draws each tile as a 3x3 block of box-drawing glyphs so corridors line up
//! across neighbouring tiles. Used for debug logs and test diagnostics.

use crate::game_state::board_state::BoardState;
use crate::game_state::maze_rules::BOARD_SIZE;
use crate::game_state::maze_types::{Openings, Position};
use crate::game_state::tile::Tile;

const WALL: char = '█';
const PASSAGE: char = ' ';
const TREASURE: char = '◆';

/// Render the grid, then one line describing the spare tile and forbidden slot.
pub fn render_board(board: &BoardState) -> String {
    let mut out = String::new();

    out.push_str("   ");
    for col in 0..BOARD_SIZE {
        out.push(' ');
        out.push(char::from(b'0' + col as u8));
        out.push(' ');
    }
    out.push('\n');

    for row in 0..BOARD_SIZE {
        let blocks: Vec<[[char; 3]; 3]> = (0..BOARD_SIZE)
            .map(|col| render_tile(board.tile(Position::new(row as u8, col as u8))))
            .collect();
        for line in 0..3 {
            if line == 1 {
                out.push(char::from(b'0' + row as u8));
                out.push_str("  ");
            } else {
                out.push_str("   ");
            }
            for block in &blocks {
                out.extend(block[line]);
            }
            out.push('\n');
        }
    }

    let spare = &board.spare_tile;
    out.push_str(&format!("spare {:x}", spare.openings.bits()));
    if let Some(treasure) = spare.treasure {
        out.push_str(&format!(" {treasure}"));
    }
    match board.forbidden_slot {
        Some(slot) => out.push_str(&format!(" forbidden {slot}")),
        None => out.push_str(" forbidden -"),
    }

    out
}

/// A tile as three rows of three glyphs. The centre shows the lowest-numbered
/// token on the tile, else a treasure marker.
pub fn render_tile(tile: &Tile) -> [[char; 3]; 3] {
    let side = |open: Openings| {
        if tile.openings.contains(open) {
            PASSAGE
        } else {
            WALL
        }
    };
    let centre = match tile.occupants.iter().next() {
        Some(player) => char::from(b'0' + player),
        None if tile.treasure.is_some() => TREASURE,
        None if tile.openings.is_empty() => WALL,
        None => PASSAGE,
    };

    [
        [WALL, side(Openings::TOP), WALL],
        [side(Openings::LEFT), centre, side(Openings::RIGHT)],
        [WALL, side(Openings::BOTTOM), WALL],
    ]
}
