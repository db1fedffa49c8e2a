//! Shift simulation and candidate enumeration.
//!
//! A shift inserts the (rotated) spare tile at a border slot, pushes the row
//! or column one step, and ejects the far tile, which becomes the new spare.
//! Tokens on the ejected tile wrap around onto the inserted one.

use crate::game_state::board_state::BoardState;
use crate::game_state::maze_errors::{MazeError, MazeResult};
use crate::game_state::maze_rules::{
    is_shift_slot, BOARD_SIZE, LAST_INDEX, MAX_SHIFT_CANDIDATES, SHIFT_SLOTS,
};
use crate::game_state::maze_types::{PlayerSet, Position, Rotation, ShiftCandidate};

/// A candidate together with the board it produces.
#[derive(Debug, Clone)]
pub struct ShiftedBoard {
    pub candidate: ShiftCandidate,
    pub board: BoardState,
}

/// Cells of the pushed row/column, ordered from the insertion slot to the
/// ejection end. `None` for anything that is not a shift slot.
pub fn axis_cells(slot: Position) -> Option<[Position; BOARD_SIZE]> {
    if !is_shift_slot(slot) {
        return None;
    }

    let mut cells = [slot; BOARD_SIZE];
    for (step, cell) in cells.iter_mut().enumerate() {
        let step = step as u8;
        *cell = if slot.col == 0 {
            Position::new(slot.row, step)
        } else if slot.col == LAST_INDEX {
            Position::new(slot.row, LAST_INDEX - step)
        } else if slot.row == 0 {
            Position::new(step, slot.col)
        } else {
            Position::new(LAST_INDEX - step, slot.col)
        };
    }
    Some(cells)
}

/// Every candidate not using `forbidden`, ordered by slot then rotation.
pub fn shift_candidates(forbidden: Option<Position>) -> Vec<ShiftCandidate> {
    let mut out = Vec::with_capacity(MAX_SHIFT_CANDIDATES);
    for slot in SHIFT_SLOTS {
        if Some(slot) == forbidden {
            continue;
        }
        for rotation in Rotation::ALL {
            out.push(ShiftCandidate::new(slot, rotation));
        }
    }
    out
}

/// Apply a shift after checking the slot is legal for this board.
pub fn apply_shift(board: &BoardState, candidate: ShiftCandidate) -> MazeResult<BoardState> {
    let cells = axis_cells(candidate.slot).ok_or(MazeError::InvalidShiftSlot(candidate.slot))?;
    if board.forbidden_slot == Some(candidate.slot) {
        return Err(MazeError::ForbiddenShiftSlot(candidate.slot));
    }
    Ok(shift_along(board, candidate.rotation, &cells))
}

fn shift_along(board: &BoardState, rotation: Rotation, cells: &[Position; BOARD_SIZE]) -> BoardState {
    let mut next = board.clone();
    let ejected = *board.tile(cells[BOARD_SIZE - 1]);

    for i in (1..BOARD_SIZE).rev() {
        *next.tile_mut(cells[i]) = *board.tile(cells[i - 1]);
    }
    *next.tile_mut(cells[0]) = board
        .spare_tile
        .rotated(rotation)
        .with_occupants(ejected.occupants);
    next.spare_tile = ejected.with_occupants(PlayerSet::EMPTY);
    next.forbidden_slot = Some(cells[BOARD_SIZE - 1]);

    debug_assert!(conserves_pieces(board, &next));
    next
}

fn conserves_pieces(before: &BoardState, after: &BoardState) -> bool {
    let occupants = |b: &BoardState| {
        b.grid
            .iter()
            .map(|t| t.occupants.len())
            .sum::<usize>()
    };
    let treasures = |b: &BoardState| {
        let mut found: Vec<_> = b
            .grid
            .iter()
            .chain(std::iter::once(&b.spare_tile))
            .filter_map(|t| t.treasure)
            .collect();
        found.sort();
        found
    };
    occupants(before) == occupants(after) && treasures(before) == treasures(after)
}

/// One shifted board per candidate not excluded by `forbidden`.
pub fn generate_shifted_boards(board: &BoardState, forbidden: Option<Position>) -> Vec<ShiftedBoard> {
    shift_candidates(forbidden)
        .into_iter()
        .filter_map(|candidate| {
            let cells = axis_cells(candidate.slot)?;
            Some(ShiftedBoard {
                candidate,
                board: shift_along(board, candidate.rotation, &cells),
            })
        })
        .collect()
}
