use std::error::Error;
use std::fmt;

use crate::game_state::maze_types::{PlayerId, Position, Treasure};

pub type MazeResult<T> = Result<T, MazeError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MazeError {
    PlayerMissing(PlayerId),
    PlayerDuplicated(PlayerId),
    TreasureDuplicated(Treasure),
    InvalidPlayerId(PlayerId),
    InvalidShiftSlot(Position),
    ForbiddenShiftSlot(Position),
    OutOfBounds(Position),
    UnreachableDestination(Position),
    InvalidPayload(String),
}

impl fmt::Display for MazeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MazeError::PlayerMissing(player) => write!(f, "player {player} is not on the board"),
            MazeError::PlayerDuplicated(player) => {
                write!(f, "player {player} occupies more than one tile")
            }
            MazeError::TreasureDuplicated(treasure) => {
                write!(f, "treasure {treasure} appears on more than one tile")
            }
            MazeError::InvalidPlayerId(player) => write!(f, "invalid player id: {player}"),
            MazeError::InvalidShiftSlot(slot) => write!(f, "{slot} is not a shift slot"),
            MazeError::ForbiddenShiftSlot(slot) => {
                write!(f, "{slot} is forbidden for this shift")
            }
            MazeError::OutOfBounds(pos) => write!(f, "{pos} is outside the board"),
            MazeError::UnreachableDestination(pos) => {
                write!(f, "{pos} is not reachable from the token")
            }
            MazeError::InvalidPayload(msg) => write!(f, "invalid payload: {msg}"),
        }
    }
}

impl Error for MazeError {}
