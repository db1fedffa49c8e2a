//! Local self-play harness.
//!
//! A `MatchReferee` deals a standard board, hands each engine the same view
//! a game server would, and checks every answer before applying it. Series
//! runs rotate seats between games and aggregate wins and move timings.

use std::collections::VecDeque;
use std::time::Instant;

use chrono::{DateTime, Utc};
use log::{debug, info, log_enabled, trace, Level};
use rand::prelude::{IndexedRandom, SliceRandom};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engines::engine_trait::Engine;
use crate::game_state::board_state::BoardState;
use crate::game_state::maze_errors::MazeError;
use crate::game_state::maze_rules::{home_corner, CELL_COUNT, MAX_PLAYERS};
use crate::game_state::maze_types::{
    MoveAction, Openings, PlayerId, Position, Rotation, Treasure, TreasureSet,
};
use crate::game_state::tile::Tile;
use crate::move_generation::reachability::reachable_from_player;
use crate::move_generation::shift_generator::apply_shift;
use crate::protocol::turn_payload::{MoveMessage, TileDescriptor};
use crate::utils::maze_notation::generate_layout;
use crate::utils::render_board::render_board;

pub type EngineFactory = Box<dyn Fn() -> Box<dyn Engine>>;

/// Fixed tiles on even/even cells: position, opening mask, treasure slot.
/// Slot `None` marks a home corner, `Some(i)` the i-th symbol.
const FIXED_TILES: [(u8, u8, u8, Option<usize>); 16] = [
    (0, 0, 0b1100, None),
    (0, 2, 0b1101, Some(0)),
    (0, 4, 0b1101, Some(1)),
    (0, 6, 0b1001, None),
    (2, 0, 0b1110, Some(2)),
    (2, 2, 0b1110, Some(3)),
    (2, 4, 0b1101, Some(4)),
    (2, 6, 0b1011, Some(5)),
    (4, 0, 0b1110, Some(6)),
    (4, 2, 0b0111, Some(7)),
    (4, 4, 0b1011, Some(8)),
    (4, 6, 0b1011, Some(9)),
    (6, 0, 0b0110, None),
    (6, 2, 0b0111, Some(10)),
    (6, 4, 0b0111, Some(11)),
    (6, 6, 0b0011, None),
];

const LOOSE_STRAIGHTS: usize = 12;
const LOOSE_CORNERS: usize = 16;
const LOOSE_T_JUNCTIONS: usize = 6;
const FIXED_SYMBOLS: usize = 12;
const CORNER_SYMBOLS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Win { player: PlayerId },
    DrawMaxTurns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesOutcome {
    EngineWin { engine: usize, seat: PlayerId },
    DrawMaxTurns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnReport {
    pub player: PlayerId,
    pub action: MoveAction,
    pub found: Option<Treasure>,
    pub winner: Option<PlayerId>,
}

/// Authoritative game state for a local match.
#[derive(Debug, Clone)]
pub struct MatchReferee {
    board: BoardState,
    stacks: Vec<VecDeque<Treasure>>,
    current: PlayerId,
    finds: Vec<(PlayerId, Treasure)>,
    discovered: TreasureSet,
    winner: Option<PlayerId>,
    turns: u32,
}

impl MatchReferee {
    /// Deal a standard board and treasure stacks for `player_count` players.
    pub fn deal<R: Rng + ?Sized>(player_count: usize, rng: &mut R) -> Result<Self, String> {
        if !(2..=MAX_PLAYERS).contains(&player_count) {
            return Err(format!(
                "a match needs 2 to {MAX_PLAYERS} players, got {player_count}"
            ));
        }

        let symbols: Vec<Treasure> = Treasure::symbols().collect();
        let (grid, spare) = deal_tiles(&symbols, rng)?;

        let mut deck = symbols;
        deck.shuffle(rng);
        let per_player = deck.len() / player_count;
        let mut stacks = Vec::with_capacity(player_count);
        for (i, hand) in deck.chunks(per_player).take(player_count).enumerate() {
            let player = (i + 1) as PlayerId;
            let home = Treasure::home_of(player)
                .ok_or_else(|| format!("no home treasure for player {player}"))?;
            let mut stack: VecDeque<Treasure> = hand.iter().copied().collect();
            stack.push_back(home);
            stacks.push(stack);
        }

        let first_target = stacks[0]
            .front()
            .copied()
            .ok_or("empty treasure stack for player 1")?;
        let mut board = BoardState::new(grid, spare, 1, first_target);
        for (i, stack) in stacks.iter().enumerate() {
            let player = (i + 1) as PlayerId;
            let corner = home_corner(player).ok_or_else(|| format!("no home corner for {player}"))?;
            *board.tile_mut(corner) = board.tile(corner).with_player(player);
            board
                .set_remaining_treasures(player, stack.len() as u8)
                .map_err(|e| e.to_string())?;
        }
        board.validate().map_err(|e| e.to_string())?;

        Ok(Self {
            board,
            stacks,
            current: 1,
            finds: Vec::new(),
            discovered: TreasureSet::EMPTY,
            winner: None,
            turns: 0,
        })
    }

    #[inline]
    pub fn current_player(&self) -> PlayerId {
        self.current
    }

    #[inline]
    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    #[inline]
    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn finds(&self) -> &[(PlayerId, Treasure)] {
        &self.finds
    }

    pub fn finds_of(&self, player: PlayerId) -> Vec<Treasure> {
        self.finds
            .iter()
            .filter(|(p, _)| *p == player)
            .map(|(_, t)| *t)
            .collect()
    }

    pub fn player_count(&self) -> usize {
        self.stacks.len()
    }

    /// What the player to move is told: the board, its next target, every
    /// player's remaining count, and the treasures found so far.
    pub fn board_for_current(&self) -> Result<BoardState, String> {
        let mut board = self.board.clone();
        board.player_id = self.current;
        board.treasure_target = self
            .stack(self.current)
            .front()
            .copied()
            .ok_or_else(|| format!("player {} has nothing left to find", self.current))?;
        board.discovered_treasures = self.discovered;
        Ok(board)
    }

    /// Check and apply the current player's move.
    pub fn play_turn(&mut self, action: MoveAction) -> Result<TurnReport, String> {
        if let Some(winner) = self.winner {
            return Err(format!("the game is over, player {winner} won"));
        }
        let player = self.current;
        let view = self.board_for_current()?;

        // The move goes through the wire shape so the rotated spare is checked
        // the same way a server would see it.
        let raw_spare = TileDescriptor::from_tile(&view.spare_tile);
        let wire = MoveMessage::from_action(&action, &raw_spare);
        let decoded = wire
            .to_action(&view.spare_tile)
            .map_err(|e| format!("player {player}: {e}"))?;

        let shifted =
            apply_shift(&view, decoded.shift).map_err(|e| format!("player {player}: {e}"))?;
        let origin = shifted
            .player_position(player)
            .ok_or_else(|| MazeError::PlayerMissing(player).to_string())?;
        let destination = decoded.destination;
        if destination != origin && !reachable_from_player(&shifted, player).contains(destination) {
            return Err(format!(
                "player {player}: {}",
                MazeError::UnreachableDestination(destination)
            ));
        }
        let mut next = shifted
            .with_player_moved(player, destination)
            .map_err(|e| format!("player {player}: {e}"))?;

        let mut found = None;
        if next.tile(destination).has_treasure(view.treasure_target) {
            let stack = self.stack_mut(player);
            stack.pop_front();
            let left = stack.len() as u8;
            next.set_remaining_treasures(player, left)
                .map_err(|e| e.to_string())?;
            if !view.treasure_target.is_home() {
                self.discovered.insert(view.treasure_target);
            }
            self.finds.push((player, view.treasure_target));
            found = Some(view.treasure_target);
            debug!("player {player} found {} ({left} to go)", view.treasure_target);
            if left == 0 {
                self.winner = Some(player);
            }
        }

        self.board = next;
        self.turns += 1;
        if log_enabled!(Level::Trace) {
            trace!("after turn {}:\n{}", self.turns, render_board(&self.board));
        }
        if self.winner.is_none() {
            self.current = self.board.following_player(player);
        }

        Ok(TurnReport {
            player,
            action: decoded,
            found,
            winner: self.winner,
        })
    }

    fn stack(&self, player: PlayerId) -> &VecDeque<Treasure> {
        &self.stacks[usize::from(player) - 1]
    }

    fn stack_mut(&mut self, player: PlayerId) -> &mut VecDeque<Treasure> {
        &mut self.stacks[usize::from(player) - 1]
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }
}

/// Fixed tiles in place, the 34 loose tiles shuffled and turned at random.
/// The last loose tile becomes the spare.
fn deal_tiles<R: Rng + ?Sized>(
    symbols: &[Treasure],
    rng: &mut R,
) -> Result<([Tile; CELL_COUNT], Tile), String> {
    let mut grid = [Tile::default(); CELL_COUNT];
    let mut fixed = [false; CELL_COUNT];
    for (row, col, mask, slot) in FIXED_TILES {
        let pos = Position::new(row, col);
        let treasure = match slot {
            Some(i) => Some(symbols[i]),
            None => home_at(pos),
        };
        grid[pos.index()] = Tile::new(Openings::from_bits_truncate(mask), treasure);
        fixed[pos.index()] = true;
    }

    let mut loose = Vec::with_capacity(LOOSE_STRAIGHTS + LOOSE_CORNERS + LOOSE_T_JUNCTIONS);
    loose.extend((0..LOOSE_STRAIGHTS).map(|_| Tile::new(Openings::STRAIGHT, None)));
    loose.extend((0..LOOSE_CORNERS).map(|i| {
        let treasure = (i < CORNER_SYMBOLS).then(|| symbols[FIXED_SYMBOLS + i]);
        Tile::new(Openings::CORNER, treasure)
    }));
    loose.extend(
        symbols[FIXED_SYMBOLS + CORNER_SYMBOLS..]
            .iter()
            .map(|t| Tile::new(Openings::T_JUNCTION, Some(*t))),
    );
    loose.shuffle(rng);

    let mut tiles = loose.into_iter().map(|tile| {
        let rotation = *Rotation::ALL.choose(&mut *rng).unwrap_or(&Rotation::Deg0);
        tile.rotated(rotation)
    });
    for (index, cell) in grid.iter_mut().enumerate() {
        if !fixed[index] {
            *cell = tiles.next().ok_or("ran out of loose tiles")?;
        }
    }
    let spare = tiles.next().ok_or("no tile left for the spare")?;
    Ok((grid, spare))
}

fn home_at(pos: Position) -> Option<Treasure> {
    (1..=MAX_PLAYERS as PlayerId)
        .find(|p| home_corner(*p) == Some(pos))
        .and_then(Treasure::home_of)
}

#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub player_count: usize,
    pub max_turns: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            player_count: 2,
            max_turns: 600,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatchResult {
    pub outcome: MatchOutcome,
    pub started_at: DateTime<Utc>,
    pub turns: u32,
    pub finds: Vec<(PlayerId, Treasure)>,
    /// Indexed by seat (player id - 1).
    pub move_counts: Vec<u32>,
    pub total_time_ns: Vec<u128>,
    pub final_board: BoardState,
}

#[derive(Debug, Clone)]
pub struct MatchSeriesConfig {
    pub games: u16,
    pub base_seed: u64,
    pub per_game: MatchConfig,
}

impl Default for MatchSeriesConfig {
    fn default() -> Self {
        Self {
            games: 9,
            base_seed: 0,
            per_game: MatchConfig::default(),
        }
    }
}

/// Per-engine totals, indexed by the engine's position in the factory list.
#[derive(Debug, Clone, Default)]
pub struct MatchSeriesStats {
    pub started_at: Option<DateTime<Utc>>,
    pub games: u16,
    pub wins: Vec<u16>,
    pub draws: u16,
    pub outcomes: Vec<SeriesOutcome>,
    pub moves: Vec<u32>,
    pub total_time_ns: Vec<u128>,
    pub avg_move_time_ms: Vec<f64>,
    pub overall_avg_move_time_ms: f64,
}

impl MatchSeriesStats {
    pub fn report(&self) -> String {
        let started = self
            .started_at
            .map(|t| t.format("%Y-%m-%dT%H:%M:%SZ").to_string())
            .unwrap_or_else(|| "-".to_owned());
        let mut out = format!("started={started} games={} draws={}", self.games, self.draws);
        for (i, wins) in self.wins.iter().enumerate() {
            let avg = self.avg_move_time_ms.get(i).copied().unwrap_or(0.0);
            out.push_str(&format!(" engine{}_wins={wins} engine{}_avg_ms={avg:.3}", i + 1, i + 1));
        }
        out.push_str(&format!(" overall_avg_ms={:.3}", self.overall_avg_move_time_ms));
        out
    }
}

/// Play one seeded match. `engines[i]` plays as player `i + 1`.
pub fn play_match(
    mut engines: Vec<Box<dyn Engine>>,
    seed: u64,
    config: &MatchConfig,
) -> Result<MatchResult, String> {
    if engines.len() != config.player_count {
        return Err(format!(
            "{} engines for a {}-player match",
            engines.len(),
            config.player_count
        ));
    }
    let started_at = Utc::now();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut referee = MatchReferee::deal(config.player_count, &mut rng)?;
    debug!("dealt layout {}", generate_layout(referee.board()));

    for engine in engines.iter_mut() {
        engine.new_game();
    }

    let mut move_counts = vec![0u32; engines.len()];
    let mut total_time_ns = vec![0u128; engines.len()];

    while referee.turns() < config.max_turns {
        let seat = usize::from(referee.current_player()) - 1;
        let view = referee.board_for_current()?;

        let started = Instant::now();
        let out = engines[seat].choose_move(&view)?;
        total_time_ns[seat] = total_time_ns[seat].saturating_add(started.elapsed().as_nanos());
        move_counts[seat] = move_counts[seat].saturating_add(1);

        let action = out
            .action
            .ok_or_else(|| format!("{} returned no action", engines[seat].name()))?;
        let report = referee.play_turn(action)?;
        if let Some(player) = report.winner {
            return Ok(MatchResult {
                outcome: MatchOutcome::Win { player },
                started_at,
                turns: referee.turns(),
                finds: referee.finds().to_vec(),
                move_counts,
                total_time_ns,
                final_board: referee.board().clone(),
            });
        }
    }

    Ok(MatchResult {
        outcome: MatchOutcome::DrawMaxTurns,
        started_at,
        turns: referee.turns(),
        finds: referee.finds().to_vec(),
        move_counts,
        total_time_ns,
        final_board: referee.board().clone(),
    })
}

/// Play a series and aggregate per-engine statistics.
///
/// Seats rotate by a random offset each game (deterministic from `base_seed`).
pub fn play_match_series(
    factories: &[EngineFactory],
    config: &MatchSeriesConfig,
) -> Result<MatchSeriesStats, String> {
    let engines = factories.len();
    let per_game = MatchConfig {
        player_count: engines,
        ..config.per_game.clone()
    };
    let mut stats = MatchSeriesStats {
        started_at: Some(Utc::now()),
        games: config.games,
        wins: vec![0; engines],
        moves: vec![0; engines],
        total_time_ns: vec![0; engines],
        ..MatchSeriesStats::default()
    };
    let mut seat_rng = StdRng::seed_from_u64(config.base_seed ^ 0xA5A5_5A5A_0123_4567);

    for i in 0..config.games {
        let offset = seat_rng.random_range(0..engines.max(1));
        let seed = config.base_seed.wrapping_add(u64::from(i));
        // Seat s is played by engine (s + offset) % n.
        let engine_at = |seat: usize| (seat + offset) % engines;
        let lineup: Vec<Box<dyn Engine>> = (0..engines).map(|s| factories[engine_at(s)]()).collect();
        info!(
            "[series] game {}/{} seed={seed} seats={:?}",
            i + 1,
            config.games,
            (0..engines).map(|s| engine_at(s) + 1).collect::<Vec<_>>()
        );

        let result = play_match(lineup, seed, &per_game)?;
        for seat in 0..engines {
            let engine = engine_at(seat);
            stats.moves[engine] = stats.moves[engine].saturating_add(result.move_counts[seat]);
            stats.total_time_ns[engine] =
                stats.total_time_ns[engine].saturating_add(result.total_time_ns[seat]);
        }

        let outcome = match result.outcome {
            MatchOutcome::Win { player } => {
                let engine = engine_at(usize::from(player) - 1);
                stats.wins[engine] += 1;
                SeriesOutcome::EngineWin {
                    engine: engine + 1,
                    seat: player,
                }
            }
            MatchOutcome::DrawMaxTurns => {
                stats.draws += 1;
                SeriesOutcome::DrawMaxTurns
            }
        };
        stats.outcomes.push(outcome);
        info!(
            "[series] game {}/{} result={outcome:?} turns={} wins={:?} draws={}",
            i + 1,
            config.games,
            result.turns,
            stats.wins,
            stats.draws
        );
    }

    stats.avg_move_time_ms = stats
        .total_time_ns
        .iter()
        .zip(&stats.moves)
        .map(|(ns, moves)| avg_ns_per_move_ms(*ns, *moves))
        .collect();
    let total_ns: u128 = stats.total_time_ns.iter().sum();
    let total_moves: u32 = stats.moves.iter().sum();
    stats.overall_avg_move_time_ms = avg_ns_per_move_ms(total_ns, total_moves);

    Ok(stats)
}

#[inline]
fn avg_ns_per_move_ms(total_ns: u128, moves: u32) -> f64 {
    if moves == 0 {
        0.0
    } else {
        (total_ns as f64) / (moves as f64) / 1_000_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::engine_greedy::GreedyEngine;
    use crate::engines::engine_random::RandomEngine;
    use crate::engines::engine_search::SearchEngine;
    use crate::search::move_search::SearchConfig;

    #[test]
    fn deal_builds_a_valid_standard_board() {
        let mut rng = StdRng::seed_from_u64(11);
        let referee = MatchReferee::deal(4, &mut rng).expect("deal should succeed");
        let board = referee.board_for_current().expect("player 1 should have a target");

        let placed: Vec<Treasure> = board
            .grid
            .iter()
            .chain(std::iter::once(&board.spare_tile))
            .filter_map(|t| t.treasure)
            .collect();
        assert_eq!(placed.len(), Treasure::COUNT);
        for player in 1..=4 {
            assert_eq!(board.remaining_treasures(player), Some(7));
            assert_eq!(board.player_position(player), home_corner(player));
        }
        assert_eq!(board.tile(Position::new(0, 0)).treasure, Some(Treasure::Start01));
        assert_eq!(board.forbidden_slot, None);
        assert_eq!(referee.player_count(), 4);
        assert!(MatchReferee::deal(1, &mut rng).is_err());
    }

    #[test]
    fn referee_rejects_illegal_moves() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut referee = MatchReferee::deal(2, &mut rng).expect("deal should succeed");
        let bad_slot = MoveAction {
            destination: Position::new(0, 0),
            shift: crate::game_state::maze_types::ShiftCandidate::new(
                Position::new(0, 0),
                Rotation::Deg0,
            ),
        };
        assert!(referee.play_turn(bad_slot).is_err());

        let mut engine = RandomEngine::new(Some(1));
        let view = referee.board_for_current().expect("view should build");
        let action = engine
            .choose_move(&view)
            .expect("engine should move")
            .action
            .expect("engine should pick an action");
        let report = referee.play_turn(action).expect("random move should be legal");
        assert_eq!(report.player, 1);
        assert_eq!(referee.current_player(), 2);
        assert_eq!(
            referee.board().forbidden_slot,
            Some(crate::game_state::maze_rules::mirror_slot(action.shift.slot))
        );
    }

    #[test]
    fn search_and_random_play_a_full_match() {
        let result = play_match(
            vec![
                Box::new(SearchEngine::new(SearchConfig::default(), Some(1))),
                Box::new(RandomEngine::new(Some(2))),
            ],
            42,
            &MatchConfig {
                max_turns: 200,
                ..MatchConfig::default()
            },
        )
        .expect("match should run");
        assert!(result.move_counts.iter().sum::<u32>() > 0);
        assert_eq!(result.move_counts.iter().sum::<u32>(), result.turns);
        assert!(result.finds.iter().all(|(p, _)| *p == 1 || *p == 2));
        assert!(result.final_board.validate().is_ok());
    }

    #[test]
    fn series_reports_per_engine_totals() {
        let factories: Vec<EngineFactory> = vec![
            Box::new(|| Box::new(GreedyEngine::new(Some(5))) as Box<dyn Engine>),
            Box::new(|| Box::new(RandomEngine::new(Some(6))) as Box<dyn Engine>),
        ];
        let stats = play_match_series(
            &factories,
            &MatchSeriesConfig {
                games: 2,
                base_seed: 777,
                per_game: MatchConfig {
                    max_turns: 40,
                    ..MatchConfig::default()
                },
            },
        )
        .expect("series should run");

        assert_eq!(stats.games, 2);
        assert_eq!(stats.outcomes.len(), 2);
        assert_eq!(stats.wins.len(), 2);
        assert!(stats.moves.iter().sum::<u32>() > 0);
        assert!(stats.overall_avg_move_time_ms >= 0.0);
        assert!(stats.report().starts_with("started="));
        assert!(stats.report().contains("engine2_wins="));
    }

    #[test_log::test]
    fn tracker_attributions_match_the_referee() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut referee = MatchReferee::deal(2, &mut rng).expect("deal should succeed");
        let mut engines = [
            SearchEngine::new(SearchConfig::default(), Some(10)),
            SearchEngine::new(SearchConfig::default(), Some(20)),
        ];

        while referee.winner().is_none() && referee.turns() < 200 {
            let seat = usize::from(referee.current_player()) - 1;
            let view = referee.board_for_current().expect("view should build");
            let action = engines[seat]
                .choose_move(&view)
                .expect("engine should move")
                .action
                .expect("engine should pick an action");
            referee.play_turn(action).expect("search moves should be legal");
        }

        for (seat, engine) in engines.iter().enumerate() {
            let me = (seat + 1) as PlayerId;
            let opponent = 3 - me;
            let truth = referee.finds_of(opponent);
            for treasure in engine.tracker().found_treasures(opponent) {
                assert!(truth.contains(treasure), "{treasure} wrongly given to {opponent}");
            }
            assert_eq!(engine.tracker().unidentified_count(), 0);
        }
    }
}
