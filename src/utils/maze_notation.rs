//! Compact text notation for maze layouts.
//!
//! A layout is seven rows of seven hex digits, one digit per tile holding its
//! opening mask (left=1, top=2, right=4, bottom=8). Rows are separated by
//! `/` or whitespace, so both `generate_layout` output and multi-line test
//! fixtures parse.
//!
//! `BoardBuilder` layers treasures, tokens, and player progress on top of a
//! layout to produce a validated `BoardState`.

use crate::game_state::board_state::BoardState;
use crate::game_state::maze_errors::MazeResult;
use crate::game_state::maze_rules::{BOARD_SIZE, CELL_COUNT, MAX_PLAYERS};
use crate::game_state::maze_types::{Openings, PlayerId, Position, Treasure, TreasureSet};
use crate::game_state::tile::Tile;

const DEFAULT_TREASURES_TO_GO: u8 = 3;

pub fn parse_layout(layout: &str) -> Result<[Openings; CELL_COUNT], String> {
    let rows: Vec<&str> = layout
        .split(|c: char| c == '/' || c.is_whitespace())
        .filter(|row| !row.is_empty())
        .collect();
    if rows.len() != BOARD_SIZE {
        return Err(format!(
            "Layout must contain {BOARD_SIZE} rows, found {}",
            rows.len()
        ));
    }

    let mut openings = [Openings::empty(); CELL_COUNT];
    for (row, row_str) in rows.iter().enumerate() {
        let digits: Vec<char> = row_str.chars().collect();
        if digits.len() != BOARD_SIZE {
            return Err(format!(
                "Layout row {row} must contain {BOARD_SIZE} tiles: '{row_str}'"
            ));
        }
        for (col, ch) in digits.into_iter().enumerate() {
            let mask = ch
                .to_digit(16)
                .ok_or_else(|| format!("Invalid opening digit '{ch}' in row {row}"))?;
            openings[row * BOARD_SIZE + col] = Openings::from_bits_truncate(mask as u8);
        }
    }

    Ok(openings)
}

/// Single-line layout of a board's grid, rows joined by `/`.
pub fn generate_layout(board: &BoardState) -> String {
    board
        .grid
        .chunks(BOARD_SIZE)
        .map(|row| {
            row.iter()
                .map(|tile| format!("{:x}", tile.openings.bits()))
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Debug, Clone)]
pub struct BoardBuilder {
    grid: [Tile; CELL_COUNT],
    spare_tile: Tile,
    acting_player: PlayerId,
    target: Treasure,
    treasures_to_go: [Option<u8>; MAX_PLAYERS],
    forbidden_slot: Option<Position>,
    discovered: TreasureSet,
}

impl BoardBuilder {
    pub fn from_layout(layout: &str) -> Result<Self, String> {
        let openings = parse_layout(layout)?;
        let mut grid = [Tile::default(); CELL_COUNT];
        for (tile, mask) in grid.iter_mut().zip(openings) {
            *tile = Tile::new(mask, None);
        }
        Ok(Self {
            grid,
            spare_tile: Tile::new(Openings::STRAIGHT, None),
            acting_player: 1,
            target: Treasure::Sym01,
            treasures_to_go: [None; MAX_PLAYERS],
            forbidden_slot: None,
            discovered: TreasureSet::EMPTY,
        })
    }

    pub fn spare(mut self, openings: Openings, treasure: Option<Treasure>) -> Self {
        self.spare_tile = Tile::new(openings, treasure);
        self
    }

    pub fn treasure(mut self, treasure: Treasure, pos: Position) -> Self {
        self.grid[pos.index()].treasure = Some(treasure);
        self
    }

    /// Put a token on `pos`. Players get a default progress entry if none was
    /// set yet.
    pub fn player(mut self, player: PlayerId, pos: Position) -> Self {
        self.grid[pos.index()] = self.grid[pos.index()].with_player(player);
        if let Some(slot) = self.progress_slot(player) {
            slot.get_or_insert(DEFAULT_TREASURES_TO_GO);
        }
        self
    }

    pub fn treasures_to_go(mut self, player: PlayerId, to_go: u8) -> Self {
        if let Some(slot) = self.progress_slot(player) {
            *slot = Some(to_go);
        }
        self
    }

    pub fn acting_player(mut self, player: PlayerId) -> Self {
        self.acting_player = player;
        self
    }

    pub fn target(mut self, treasure: Treasure) -> Self {
        self.target = treasure;
        self
    }

    pub fn forbidden(mut self, slot: Position) -> Self {
        self.forbidden_slot = Some(slot);
        self
    }

    pub fn discovered(mut self, treasure: Treasure) -> Self {
        self.discovered.insert(treasure);
        self
    }

    fn progress_slot(&mut self, player: PlayerId) -> Option<&mut Option<u8>> {
        usize::from(player)
            .checked_sub(1)
            .and_then(|i| self.treasures_to_go.get_mut(i))
    }

    pub fn build(self) -> MazeResult<BoardState> {
        let mut board = BoardState::new(self.grid, self.spare_tile, self.acting_player, self.target);
        board.treasures_to_go = self.treasures_to_go;
        board.forbidden_slot = self.forbidden_slot;
        board.discovered_treasures = self.discovered;
        board.validate()?;
        Ok(board)
    }
}
