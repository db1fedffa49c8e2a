//! A single maze cell.

use crate::game_state::maze_types::{Direction, Openings, PlayerId, PlayerSet, Rotation, Treasure};

/// Tiles are values: every change produces a fresh copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Tile {
    pub openings: Openings,
    pub occupants: PlayerSet,
    pub treasure: Option<Treasure>,
}

impl Tile {
    #[inline]
    pub const fn new(openings: Openings, treasure: Option<Treasure>) -> Self {
        Self {
            openings,
            occupants: PlayerSet::EMPTY,
            treasure,
        }
    }

    #[inline]
    pub fn rotated(self, rotation: Rotation) -> Self {
        Self {
            openings: self.openings.rotated(rotation),
            ..self
        }
    }

    #[inline]
    pub fn with_occupants(self, occupants: PlayerSet) -> Self {
        Self { occupants, ..self }
    }

    #[inline]
    pub fn with_player(self, player: PlayerId) -> Self {
        self.with_occupants(self.occupants.with(player))
    }

    #[inline]
    pub fn without_player(self, player: PlayerId) -> Self {
        self.with_occupants(self.occupants.without(player))
    }

    #[inline]
    pub fn contains_player(&self, player: PlayerId) -> bool {
        self.occupants.contains(player)
    }

    #[inline]
    pub fn has_treasure(&self, treasure: Treasure) -> bool {
        self.treasure == Some(treasure)
    }

    #[inline]
    pub fn is_open(&self, direction: Direction) -> bool {
        self.openings.contains(direction.opening())
    }
}
