//! Cross-turn inference of which opponent collected which treasure.
//!
//! Each turn payload only reports the set of treasures found so far and the
//! remaining count per player. The tracker diffs that against what it has
//! already accounted for and reconstructs the finder of each new treasure
//! from token positions and the spare tile.
//!
//! A tracker lives for one game; create a fresh one (or call `reset`) when a
//! new game starts.

use std::collections::BTreeMap;

use log::{debug, info, warn};

use crate::game_state::board_state::BoardState;
use crate::game_state::maze_rules::{mirror_slot, treasures_per_player};
use crate::game_state::maze_types::{PlayerId, Treasure, TreasureSet};

/// Most opponents that can move between two of our turns.
const MAX_FINDS_PER_ROUND: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct TreasureTracker {
    treasures_per_player: Option<u8>,
    found_by_player: BTreeMap<PlayerId, Vec<Treasure>>,
    accounted_by_player: BTreeMap<PlayerId, u8>,
    accounted: TreasureSet,
    unidentified: usize,
}

impl TreasureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn initialize(&mut self, board: &BoardState) -> u8 {
        if let Some(per) = self.treasures_per_player {
            return per;
        }
        let dealt = treasures_per_player(board.player_count());
        let observed = board
            .players()
            .filter_map(|p| board.remaining_treasures(p))
            .max()
            .unwrap_or(0);
        let per = dealt.max(observed);
        info!(
            "treasure tracker: {} players, {} treasures each",
            board.player_count(),
            per
        );
        self.treasures_per_player = Some(per);
        per
    }

    /// Refresh from a newly received board. Never fails: finds that cannot be
    /// attributed are counted as unidentified.
    pub fn update(&mut self, board: &BoardState) {
        let per = self.initialize(board);

        let newly_found: Vec<Treasure> = board
            .discovered_treasures
            .difference(self.accounted)
            .iter()
            .collect();
        if newly_found.is_empty() {
            return;
        }

        let mut finders = Vec::new();
        let mut counts_agree = true;
        for player in board.opponents() {
            let Some(to_go) = board.remaining_treasures(player) else {
                continue;
            };
            let found = per.saturating_sub(to_go);
            let accounted = self.accounted_count(player);
            match found.saturating_sub(accounted) {
                0 => {}
                1 => finders.push(player),
                _ => counts_agree = false,
            }
        }

        debug!(
            "treasure tracker: new finds {:?} by players {:?}",
            newly_found, finders
        );

        let attribution = if counts_agree
            && finders.len() == newly_found.len()
            && newly_found.len() <= MAX_FINDS_PER_ROUND
        {
            attribute(board, newly_found.clone(), finders.clone())
        } else {
            None
        };

        match attribution {
            Some(pairs) => {
                for (player, treasure) in pairs {
                    self.record(player, treasure);
                }
            }
            None => {
                warn!(
                    "treasure tracker: could not attribute {} new finds",
                    newly_found.len()
                );
                self.unidentified += newly_found.len();
                for treasure in newly_found {
                    self.accounted.insert(treasure);
                }
                for player in board.opponents() {
                    if let Some(to_go) = board.remaining_treasures(player) {
                        let found = per.saturating_sub(to_go);
                        let entry = self.accounted_by_player.entry(player).or_insert(0);
                        *entry = (*entry).max(found);
                    }
                }
            }
        }
    }

    fn record(&mut self, player: PlayerId, treasure: Treasure) {
        debug_assert!(!self.accounted.contains(treasure));
        info!("treasure tracker: player {player} found {treasure}");
        self.accounted.insert(treasure);
        self.found_by_player.entry(player).or_default().push(treasure);
        *self.accounted_by_player.entry(player).or_insert(0) += 1;
    }

    /// The acting player is about to collect its current target.
    pub fn record_own_find(&mut self, board: &BoardState) {
        self.initialize(board);
        if !self.accounted.contains(board.treasure_target) {
            self.record(board.player_id, board.treasure_target);
        }
    }

    fn accounted_count(&self, player: PlayerId) -> u8 {
        self.accounted_by_player.get(&player).copied().unwrap_or(0)
    }

    pub fn found_treasures(&self, player: PlayerId) -> &[Treasure] {
        self.found_by_player
            .get(&player)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Treasures nobody is known to have collected yet.
    pub fn missing_treasures(&self) -> Vec<Treasure> {
        Treasure::ALL
            .into_iter()
            .filter(|t| !self.accounted.contains(*t))
            .collect()
    }

    /// Treasures `player` might still be hunting. With one treasure to go it
    /// can only be the player's home; otherwise every unaccounted symbol, the
    /// player's own home, and (for opponents) minus our current target.
    pub fn possible_missing_for(&self, board: &BoardState, player: PlayerId) -> Vec<Treasure> {
        if board.remaining_treasures(player) == Some(1) {
            return Treasure::home_of(player).into_iter().collect();
        }
        Treasure::ALL
            .into_iter()
            .filter(|t| !self.accounted.contains(*t))
            .filter(|t| t.home_player().map_or(true, |owner| owner == player))
            .filter(|t| player == board.player_id || *t != board.treasure_target)
            .collect()
    }

    #[inline]
    pub fn unidentified_count(&self) -> usize {
        self.unidentified
    }
}

/// Pair each new treasure with its finder. `None` as soon as any step of the
/// inference does not line up with the board.
fn attribute(
    board: &BoardState,
    mut treasures: Vec<Treasure>,
    mut finders: Vec<PlayerId>,
) -> Option<Vec<(PlayerId, Treasure)>> {
    let me = board.player_id;
    let previous = board.previous_player(me);
    let mut pairs = Vec::with_capacity(treasures.len());

    let under_token = |player: PlayerId| -> Option<Treasure> {
        board
            .player_position(player)
            .and_then(|pos| board.tile(pos).treasure)
    };

    loop {
        let (player, treasure) = match treasures.len() {
            0 => return Some(pairs),
            1 => (*finders.first()?, treasures[0]),
            2 if finders.contains(&previous) => (previous, under_token(previous)?),
            2 => {
                // The mover before `previous` has been shifted over once since
                // its find. If that shift ejected its tile, the token wrapped
                // onto the insertion slot and the treasure is now the spare.
                let two_before = board.previous_player(previous);
                if !finders.contains(&two_before) {
                    return None;
                }
                let inserted_at = mirror_slot(board.forbidden_slot?);
                let pos = board.player_position(two_before)?;
                let treasure = if pos == inserted_at {
                    board.spare_tile.treasure?
                } else {
                    board.tile(pos).treasure?
                };
                (two_before, treasure)
            }
            3 => {
                if !finders.contains(&previous) {
                    return None;
                }
                (previous, under_token(previous)?)
            }
            _ => return None,
        };

        let t_index = treasures.iter().position(|t| *t == treasure)?;
        let p_index = finders.iter().position(|p| *p == player)?;
        treasures.remove(t_index);
        finders.remove(p_index);
        pairs.push((player, treasure));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::maze_types::{Openings, Position};
    use crate::utils::maze_notation::BoardBuilder;

    fn four_player_builder() -> BoardBuilder {
        BoardBuilder::from_layout(&"fffffff/".repeat(7))
            .expect("layout should parse")
            .target(Treasure::Sym01)
            .treasure(Treasure::Sym01, Position::new(3, 3))
            .player(1, Position::new(0, 0))
            .treasures_to_go(1, 7)
            .treasures_to_go(2, 7)
            .treasures_to_go(3, 7)
            .treasures_to_go(4, 7)
    }

    fn primed_tracker() -> TreasureTracker {
        let board = four_player_builder()
            .player(2, Position::new(0, 6))
            .player(3, Position::new(6, 0))
            .player(4, Position::new(6, 6))
            .build()
            .expect("board should build");
        let mut tracker = TreasureTracker::new();
        tracker.update(&board);
        tracker
    }

    #[test]
    fn single_find_is_attributed_directly() {
        let mut tracker = primed_tracker();
        let board = four_player_builder()
            .player(2, Position::new(0, 6))
            .player(3, Position::new(6, 0))
            .player(4, Position::new(6, 6))
            .treasures_to_go(2, 6)
            .discovered(Treasure::Sym12)
            .build()
            .expect("board should build");
        tracker.update(&board);
        assert_eq!(tracker.found_treasures(2), &[Treasure::Sym12]);
        assert_eq!(tracker.unidentified_count(), 0);
    }

    #[test_log::test]
    fn two_finds_with_previous_mover_among_finders() {
        let mut tracker = primed_tracker();
        // Player 4 moved last and still stands on its find.
        let board = four_player_builder()
            .player(2, Position::new(0, 6))
            .player(3, Position::new(4, 4))
            .player(4, Position::new(2, 2))
            .treasure(Treasure::Sym05, Position::new(2, 2))
            .treasure(Treasure::Sym06, Position::new(5, 5))
            .treasures_to_go(3, 6)
            .treasures_to_go(4, 6)
            .forbidden(Position::new(3, 0))
            .discovered(Treasure::Sym05)
            .discovered(Treasure::Sym06)
            .build()
            .expect("board should build");
        tracker.update(&board);
        assert_eq!(tracker.found_treasures(4), &[Treasure::Sym05]);
        assert_eq!(tracker.found_treasures(3), &[Treasure::Sym06]);
        assert_eq!(tracker.unidentified_count(), 0);
    }

    #[test]
    fn two_finds_where_the_earlier_finder_was_wrapped_around() {
        let mut tracker = primed_tracker();
        // Player 4 shifted row 1 from (1,0): player 3's tile was ejected and
        // is now the spare, player 3 wrapped onto (1,0).
        let board = four_player_builder()
            .spare(Openings::CORNER, Some(Treasure::Sym07))
            .player(2, Position::new(5, 1))
            .player(3, Position::new(1, 0))
            .player(4, Position::new(6, 6))
            .treasure(Treasure::Sym08, Position::new(5, 1))
            .treasures_to_go(2, 6)
            .treasures_to_go(3, 6)
            .forbidden(Position::new(1, 6))
            .discovered(Treasure::Sym07)
            .discovered(Treasure::Sym08)
            .build()
            .expect("board should build");
        tracker.update(&board);
        assert_eq!(tracker.found_treasures(3), &[Treasure::Sym07]);
        assert_eq!(tracker.found_treasures(2), &[Treasure::Sym08]);
    }

    #[test]
    fn three_finds_resolve_back_to_front() {
        let mut tracker = primed_tracker();
        let board = four_player_builder()
            .player(2, Position::new(1, 1))
            .player(3, Position::new(2, 2))
            .player(4, Position::new(4, 4))
            .treasure(Treasure::Sym09, Position::new(4, 4))
            .treasure(Treasure::Sym10, Position::new(2, 2))
            .treasure(Treasure::Sym11, Position::new(5, 5))
            .treasures_to_go(2, 6)
            .treasures_to_go(3, 6)
            .treasures_to_go(4, 6)
            .forbidden(Position::new(0, 3))
            .discovered(Treasure::Sym09)
            .discovered(Treasure::Sym10)
            .discovered(Treasure::Sym11)
            .build()
            .expect("board should build");
        tracker.update(&board);
        assert_eq!(tracker.found_treasures(4), &[Treasure::Sym09]);
        assert_eq!(tracker.found_treasures(3), &[Treasure::Sym10]);
        assert_eq!(tracker.found_treasures(2), &[Treasure::Sym11]);
        assert_eq!(tracker.unidentified_count(), 0);
    }

    #[test]
    fn mismatched_counts_are_recorded_as_unidentified() {
        let mut tracker = primed_tracker();
        // Two new treasures but only one opponent's count dropped.
        let board = four_player_builder()
            .player(2, Position::new(0, 6))
            .player(3, Position::new(6, 0))
            .player(4, Position::new(6, 6))
            .treasures_to_go(4, 6)
            .discovered(Treasure::Sym13)
            .discovered(Treasure::Sym14)
            .build()
            .expect("board should build");
        tracker.update(&board);
        assert_eq!(tracker.unidentified_count(), 2);
        assert!(tracker.found_treasures(4).is_empty());

        // The next update does not see those treasures again.
        tracker.update(&board);
        assert_eq!(tracker.unidentified_count(), 2);
    }

    #[test]
    fn own_finds_are_not_attributed_twice() {
        let mut tracker = primed_tracker();
        let board = four_player_builder()
            .player(2, Position::new(0, 6))
            .player(3, Position::new(6, 0))
            .player(4, Position::new(6, 6))
            .build()
            .expect("board should build");
        tracker.record_own_find(&board);

        let next = four_player_builder()
            .player(2, Position::new(0, 6))
            .player(3, Position::new(6, 0))
            .player(4, Position::new(6, 6))
            .treasures_to_go(1, 6)
            .discovered(Treasure::Sym01)
            .build()
            .expect("board should build");
        tracker.update(&next);
        assert_eq!(tracker.found_treasures(1), &[Treasure::Sym01]);
        assert_eq!(tracker.unidentified_count(), 0);
        assert!(!tracker.missing_treasures().contains(&Treasure::Sym01));
    }

    #[test]
    fn possible_missing_excludes_foreign_homes_and_our_target() {
        let tracker = primed_tracker();
        let board = four_player_builder()
            .player(2, Position::new(0, 6))
            .player(3, Position::new(6, 0))
            .player(4, Position::new(6, 6))
            .treasures_to_go(4, 1)
            .build()
            .expect("board should build");

        let for_two = tracker.possible_missing_for(&board, 2);
        assert!(for_two.contains(&Treasure::Start02));
        assert!(!for_two.contains(&Treasure::Start01));
        assert!(!for_two.contains(&Treasure::Sym01));
        assert_eq!(for_two.len(), 24);

        assert_eq!(tracker.possible_missing_for(&board, 4), vec![Treasure::Start04]);
        assert!(tracker.possible_missing_for(&board, 1).contains(&Treasure::Sym01));
    }
}
