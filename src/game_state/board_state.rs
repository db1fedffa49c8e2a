//! Core maze state representation.
//!
//! `BoardState` is the root value every simulation step works on: the 7x7
//! grid, the spare tile, the slot the next shift may not use, and the progress
//! of every player. Shifting and moving always produce a fresh clone.

use crate::game_state::maze_errors::{MazeError, MazeResult};
use crate::game_state::maze_rules::{home_corner, is_valid_player_id, CELL_COUNT, MAX_PLAYERS};
use crate::game_state::maze_types::{PlayerId, Position, Treasure, TreasureSet};
use crate::game_state::tile::Tile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    /// Row-major cells; index with `Position::index`.
    pub grid: [Tile; CELL_COUNT],
    pub spare_tile: Tile,
    /// Absent on the first turn of a game.
    pub forbidden_slot: Option<Position>,
    /// The acting player.
    pub player_id: PlayerId,
    pub treasure_target: Treasure,
    /// Remaining treasures per player id (`index = id - 1`); `None` when the
    /// player is not in the game.
    pub treasures_to_go: [Option<u8>; MAX_PLAYERS],
    /// Treasures anyone has collected so far.
    pub discovered_treasures: TreasureSet,
}

impl BoardState {
    pub fn new(
        grid: [Tile; CELL_COUNT],
        spare_tile: Tile,
        player_id: PlayerId,
        treasure_target: Treasure,
    ) -> Self {
        Self {
            grid,
            spare_tile,
            forbidden_slot: None,
            player_id,
            treasure_target,
            treasures_to_go: [None; MAX_PLAYERS],
            discovered_treasures: TreasureSet::EMPTY,
        }
    }

    #[inline]
    pub fn tile(&self, pos: Position) -> &Tile {
        &self.grid[pos.index()]
    }

    #[inline]
    pub fn tile_mut(&mut self, pos: Position) -> &mut Tile {
        &mut self.grid[pos.index()]
    }

    pub fn player_position(&self, player: PlayerId) -> Option<Position> {
        self.grid
            .iter()
            .position(|tile| tile.contains_player(player))
            .map(Position::from_index)
    }

    pub fn treasure_position(&self, treasure: Treasure) -> Option<Position> {
        self.grid
            .iter()
            .position(|tile| tile.has_treasure(treasure))
            .map(Position::from_index)
    }

    /// Where the acting player's target currently lies, if it is on the grid.
    #[inline]
    pub fn target_position(&self) -> Option<Position> {
        self.treasure_position(self.treasure_target)
    }

    /// Position of a player's home marker, falling back to its fixed corner.
    pub fn home_position(&self, player: PlayerId) -> Option<Position> {
        Treasure::home_of(player)
            .and_then(|home| self.treasure_position(home))
            .or_else(|| home_corner(player))
    }

    #[inline]
    pub fn remaining_treasures(&self, player: PlayerId) -> Option<u8> {
        if is_valid_player_id(player) {
            self.treasures_to_go[usize::from(player) - 1]
        } else {
            None
        }
    }

    pub fn set_remaining_treasures(&mut self, player: PlayerId, to_go: u8) -> MazeResult<()> {
        if !is_valid_player_id(player) {
            return Err(MazeError::InvalidPlayerId(player));
        }
        self.treasures_to_go[usize::from(player) - 1] = Some(to_go);
        Ok(())
    }

    /// Players taking part in this game, in id order.
    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        (1..=MAX_PLAYERS as PlayerId).filter(|p| self.remaining_treasures(*p).is_some())
    }

    pub fn opponents(&self) -> impl Iterator<Item = PlayerId> + '_ {
        let me = self.player_id;
        self.players().filter(move |p| *p != me)
    }

    #[inline]
    pub fn player_count(&self) -> usize {
        self.players().count()
    }

    /// The player who moves after `player`: the next higher id, wrapping to
    /// the lowest.
    pub fn following_player(&self, player: PlayerId) -> PlayerId {
        self.players()
            .find(|p| *p > player)
            .or_else(|| self.players().next())
            .unwrap_or(player)
    }

    /// The player who moved before `player`.
    pub fn previous_player(&self, player: PlayerId) -> PlayerId {
        self.players()
            .filter(|p| *p < player)
            .last()
            .or_else(|| self.players().last())
            .unwrap_or(player)
    }

    /// Clone with `player`'s token lifted from wherever it stands and put on
    /// `destination`.
    pub fn with_player_moved(&self, player: PlayerId, destination: Position) -> MazeResult<Self> {
        if !destination.is_on_board() {
            return Err(MazeError::OutOfBounds(destination));
        }
        let origin = self
            .player_position(player)
            .ok_or(MazeError::PlayerMissing(player))?;

        let mut next = self.clone();
        let lifted = next.tile(origin).without_player(player);
        *next.tile_mut(origin) = lifted;
        let placed = next.tile(destination).with_player(player);
        *next.tile_mut(destination) = placed;
        Ok(next)
    }

    /// Check the structural invariants every turn payload must satisfy.
    pub fn validate(&self) -> MazeResult<()> {
        if !is_valid_player_id(self.player_id) {
            return Err(MazeError::InvalidPlayerId(self.player_id));
        }
        if self.remaining_treasures(self.player_id).is_none() {
            return Err(MazeError::PlayerMissing(self.player_id));
        }

        let mut seen_players = [0u8; MAX_PLAYERS];
        for tile in &self.grid {
            for player in tile.occupants.iter() {
                if !is_valid_player_id(player) {
                    return Err(MazeError::InvalidPlayerId(player));
                }
                seen_players[usize::from(player) - 1] += 1;
            }
        }
        for player in self.players() {
            match seen_players[usize::from(player) - 1] {
                0 => return Err(MazeError::PlayerMissing(player)),
                1 => {}
                _ => return Err(MazeError::PlayerDuplicated(player)),
            }
        }

        let mut seen_treasures = TreasureSet::EMPTY;
        let placed = self
            .grid
            .iter()
            .chain(std::iter::once(&self.spare_tile))
            .filter_map(|tile| tile.treasure);
        for treasure in placed {
            if !seen_treasures.insert(treasure) {
                return Err(MazeError::TreasureDuplicated(treasure));
            }
        }

        Ok(())
    }
}
