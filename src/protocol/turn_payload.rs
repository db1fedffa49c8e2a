//! Wire shapes for one turn and its reply, plus conversion to and from the
//! engine's `BoardState`.
//!
//! Field names follow the game server's message vocabulary (`shiftCard`,
//! `newPinPos`, `treasuresToGo`, ...) in camelCase JSON.

use serde::{Deserialize, Serialize};

use crate::game_state::board_state::BoardState;
use crate::game_state::maze_errors::{MazeError, MazeResult};
use crate::game_state::maze_rules::{is_shift_slot, is_valid_player_id, BOARD_SIZE, CELL_COUNT};
use crate::game_state::maze_types::{
    MoveAction, Openings, PlayerId, PlayerSet, Position, Rotation, ShiftCandidate, Treasure,
};
use crate::game_state::tile::Tile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OpeningsDescriptor {
    pub left: bool,
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
}

impl From<Openings> for OpeningsDescriptor {
    fn from(openings: Openings) -> Self {
        Self {
            left: openings.contains(Openings::LEFT),
            top: openings.contains(Openings::TOP),
            right: openings.contains(Openings::RIGHT),
            bottom: openings.contains(Openings::BOTTOM),
        }
    }
}

impl From<OpeningsDescriptor> for Openings {
    fn from(d: OpeningsDescriptor) -> Self {
        Openings::from_sides(d.left, d.top, d.right, d.bottom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TileDescriptor {
    pub openings: OpeningsDescriptor,
    /// Ids of the players standing on this tile.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pin: Vec<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treasure: Option<Treasure>,
}

impl TileDescriptor {
    pub fn from_tile(tile: &Tile) -> Self {
        Self {
            openings: tile.openings.into(),
            pin: tile.occupants.iter().collect(),
            treasure: tile.treasure,
        }
    }

    pub fn to_tile(&self) -> MazeResult<Tile> {
        let mut occupants = PlayerSet::EMPTY;
        for player in &self.pin {
            if !is_valid_player_id(*player) {
                return Err(MazeError::InvalidPlayerId(*player));
            }
            occupants = occupants.with(*player);
        }
        Ok(Tile::new(self.openings.into(), self.treasure).with_occupants(occupants))
    }

    /// Same tile turned clockwise; pins and treasure unchanged.
    pub fn rotated(&self, rotation: Rotation) -> Self {
        let openings = Openings::from(self.openings).rotated(rotation);
        Self {
            openings: openings.into(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionDescriptor {
    pub row: u8,
    pub col: u8,
}

impl From<Position> for PositionDescriptor {
    fn from(pos: Position) -> Self {
        Self {
            row: pos.row,
            col: pos.col,
        }
    }
}

impl From<PositionDescriptor> for Position {
    fn from(d: PositionDescriptor) -> Self {
        Position::new(d.row, d.col)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardDescriptor {
    pub rows: Vec<Vec<TileDescriptor>>,
    pub shift_card: TileDescriptor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forbidden: Option<PositionDescriptor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasuresToGoDescriptor {
    pub player: PlayerId,
    pub treasures: u8,
}

/// Everything the engine receives for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnPayload {
    pub board: BoardDescriptor,
    pub player_id: PlayerId,
    /// The acting player's next target.
    pub treasure: Treasure,
    pub treasures_to_go: Vec<TreasuresToGoDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub found_treasures: Option<Vec<Treasure>>,
}

impl TurnPayload {
    pub fn to_board_state(&self) -> MazeResult<BoardState> {
        if self.board.rows.len() != BOARD_SIZE {
            return Err(MazeError::InvalidPayload(format!(
                "board has {} rows, expected {BOARD_SIZE}",
                self.board.rows.len()
            )));
        }

        let mut grid = [Tile::default(); CELL_COUNT];
        for (row, cols) in self.board.rows.iter().enumerate() {
            if cols.len() != BOARD_SIZE {
                return Err(MazeError::InvalidPayload(format!(
                    "row {row} has {} tiles, expected {BOARD_SIZE}",
                    cols.len()
                )));
            }
            for (col, descriptor) in cols.iter().enumerate() {
                grid[row * BOARD_SIZE + col] = descriptor.to_tile()?;
            }
        }

        let spare = self
            .board
            .shift_card
            .to_tile()?
            .with_occupants(PlayerSet::EMPTY);
        let mut board = BoardState::new(grid, spare, self.player_id, self.treasure);

        if let Some(forbidden) = self.board.forbidden {
            let slot = Position::from(forbidden);
            if !is_shift_slot(slot) {
                return Err(MazeError::InvalidShiftSlot(slot));
            }
            board.forbidden_slot = Some(slot);
        }
        for entry in &self.treasures_to_go {
            board.set_remaining_treasures(entry.player, entry.treasures)?;
        }
        if let Some(found) = &self.found_treasures {
            board.discovered_treasures = found.iter().copied().collect();
        }

        board.validate()?;
        Ok(board)
    }

    pub fn from_board_state(board: &BoardState) -> Self {
        let rows = board
            .grid
            .chunks(BOARD_SIZE)
            .map(|row| row.iter().map(TileDescriptor::from_tile).collect())
            .collect();
        Self {
            board: BoardDescriptor {
                rows,
                shift_card: TileDescriptor::from_tile(&board.spare_tile),
                forbidden: board.forbidden_slot.map(PositionDescriptor::from),
            },
            player_id: board.player_id,
            treasure: board.treasure_target,
            treasures_to_go: board
                .players()
                .filter_map(|player| {
                    board
                        .remaining_treasures(player)
                        .map(|treasures| TreasuresToGoDescriptor { player, treasures })
                })
                .collect(),
            found_treasures: Some(board.discovered_treasures.iter().collect()),
        }
    }
}

/// Reply to a turn: where to insert, the spare as inserted, where to walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveMessage {
    pub shift_position: PositionDescriptor,
    pub new_pin_pos: PositionDescriptor,
    pub shift_card: TileDescriptor,
}

impl MoveMessage {
    /// The rotation is carried by re-applying it to the raw spare as received.
    pub fn from_action(action: &MoveAction, raw_spare: &TileDescriptor) -> Self {
        Self {
            shift_position: action.shift.slot.into(),
            new_pin_pos: action.destination.into(),
            shift_card: raw_spare.rotated(action.shift.rotation),
        }
    }

    /// Recover the action, inferring the rotation from the spare as it was
    /// before rotating.
    pub fn to_action(&self, raw_spare: &Tile) -> MazeResult<MoveAction> {
        let rotation = rotation_between(raw_spare.openings, self.shift_card.openings.into())
            .ok_or_else(|| {
                MazeError::InvalidPayload("shift card is not a rotation of the spare".to_owned())
            })?;
        if self.shift_card.treasure != raw_spare.treasure {
            return Err(MazeError::InvalidPayload(
                "shift card treasure does not match the spare".to_owned(),
            ));
        }
        Ok(MoveAction {
            destination: self.new_pin_pos.into(),
            shift: ShiftCandidate::new(self.shift_position.into(), rotation),
        })
    }
}

/// Smallest clockwise rotation turning `raw` into `rotated`.
pub fn rotation_between(raw: Openings, rotated: Openings) -> Option<Rotation> {
    Rotation::ALL
        .into_iter()
        .find(|rotation| raw.rotated(*rotation) == rotated)
}
