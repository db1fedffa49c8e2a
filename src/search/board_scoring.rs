//! Shift filters and destination ratings used by move search.
//!
//! Filters narrow a candidate list to its best-scoring members and keep every
//! tie; the final pick among survivors is a seeded random choice.

use rand::prelude::IndexedRandom;
use rand::Rng;

use crate::game_state::board_state::BoardState;
use crate::game_state::maze_types::{PlayerId, Position};
use crate::move_generation::reachability::{
    reachable_from_player, reachable_treasure_count, ReachableSet,
};
use crate::move_generation::shift_generator::ShiftedBoard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftFilter {
    /// Fewest treasures reachable by the opponents closest to winning.
    MinimizeLeadingOpponentsReachableTreasures,
    /// Most treasures reachable by the acting player.
    MaximizeOwnReachableTreasures,
    /// Acting player can also reach its home tile.
    AlsoReachesHome,
}

impl ShiftFilter {
    /// Candidates scoring best under this filter, in input order. Returns the
    /// input unchanged when the filter has nothing to work with.
    pub fn narrow<'a>(self, boards: &[&'a ShiftedBoard]) -> Vec<&'a ShiftedBoard> {
        let Some(first) = boards.first() else {
            return Vec::new();
        };

        match self {
            ShiftFilter::MinimizeLeadingOpponentsReachableTreasures => {
                let leaders = leading_opponents(&first.board);
                if leaders.is_empty() {
                    return boards.to_vec();
                }
                keep_best(boards, |b| {
                    let total: usize = leaders
                        .iter()
                        .map(|p| reachable_treasure_count(&b.board, *p))
                        .sum();
                    -(total as i64)
                })
            }
            ShiftFilter::MaximizeOwnReachableTreasures => keep_best(boards, |b| {
                reachable_treasure_count(&b.board, b.board.player_id) as i64
            }),
            ShiftFilter::AlsoReachesHome => {
                let reaching: Vec<&ShiftedBoard> = boards
                    .iter()
                    .copied()
                    .filter(|b| {
                        let me = b.board.player_id;
                        b.board
                            .home_position(me)
                            .is_some_and(|home| reachable_from_player(&b.board, me).contains(home))
                    })
                    .collect();
                if reaching.is_empty() {
                    boards.to_vec()
                } else {
                    reaching
                }
            }
        }
    }
}

fn keep_best<'a>(
    boards: &[&'a ShiftedBoard],
    score: impl Fn(&ShiftedBoard) -> i64,
) -> Vec<&'a ShiftedBoard> {
    let scored: Vec<(i64, &ShiftedBoard)> = boards.iter().map(|b| (score(b), *b)).collect();
    let Some(best) = scored.iter().map(|(s, _)| *s).max() else {
        return Vec::new();
    };
    scored
        .into_iter()
        .filter(|(s, _)| *s == best)
        .map(|(_, b)| b)
        .collect()
}

/// Opponents with the smallest remaining-treasure count.
pub fn leading_opponents(board: &BoardState) -> Vec<PlayerId> {
    let Some(fewest) = board
        .opponents()
        .filter_map(|p| board.remaining_treasures(p))
        .min()
    else {
        return Vec::new();
    };
    board
        .opponents()
        .filter(|p| board.remaining_treasures(*p) == Some(fewest))
        .collect()
}

#[inline]
pub fn pick_random<'a, R: Rng + ?Sized>(
    boards: &[&'a ShiftedBoard],
    rng: &mut R,
) -> Option<&'a ShiftedBoard> {
    boards.choose(rng).copied()
}

/// Apply `filters` in order, then break the remaining tie at random.
pub fn select_shift<'a, R: Rng + ?Sized>(
    boards: &[&'a ShiftedBoard],
    filters: &[ShiftFilter],
    rng: &mut R,
) -> Option<&'a ShiftedBoard> {
    let mut survivors = boards.to_vec();
    for filter in filters {
        survivors = filter.narrow(&survivors);
    }
    pick_random(&survivors, rng)
}

/// Where to walk when the target cannot be reached this turn.
///
/// Prefers the reachable tile nearest (Euclidean) to a diagonal neighbour of
/// the target; with the target off the grid, the tile farthest from the
/// token; with nothing reachable, the token stays put. Ties go to the first
/// tile in row-major order.
pub fn fallback_destination(board: &BoardState, player: PlayerId) -> Option<Position> {
    let origin = board.player_position(player)?;
    let reach = reachable_from_player(board, player);
    if reach.is_empty() {
        return Some(origin);
    }

    let pick = match board.target_position() {
        Some(target) => closest_to_diagonals(reach, target),
        None => farthest_from(reach, origin),
    };
    Some(pick.unwrap_or(origin))
}

fn closest_to_diagonals(reach: ReachableSet, target: Position) -> Option<Position> {
    let diagonals: Vec<Position> = target.diagonal_neighbours().collect();
    let mut best: Option<(f64, Position)> = None;
    for pos in reach.iter() {
        let distance = diagonals
            .iter()
            .map(|d| pos.euclidean_distance(*d))
            .fold(f64::INFINITY, f64::min);
        if best.map_or(true, |(d, _)| distance < d) {
            best = Some((distance, pos));
        }
    }
    best.map(|(_, pos)| pos)
}

/// Reachable tile with the largest Euclidean distance from `origin`.
pub fn farthest_from(reach: ReachableSet, origin: Position) -> Option<Position> {
    let mut best: Option<(f64, Position)> = None;
    for pos in reach.iter() {
        let distance = pos.euclidean_distance(origin);
        if best.map_or(true, |(d, _)| distance > d) {
            best = Some((distance, pos));
        }
    }
    best.map(|(_, pos)| pos)
}
