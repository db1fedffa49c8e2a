//! Small value types shared by the maze model, move generation, and search.
//!
//! Everything here is `Copy`: positions, directions, rotations, opening masks,
//! occupant sets and treasure ids are passed around by value in hot loops.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::game_state::maze_rules::{BOARD_SIZE, LAST_INDEX, MAX_PLAYERS};

/// Player ids are small positive integers (`1..=4`).
pub type PlayerId = u8;

/// Board coordinate (`0..=6` on both axes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    #[inline]
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Row-major cell index.
    #[inline]
    pub const fn index(self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }

    #[inline]
    pub const fn from_index(index: usize) -> Self {
        Self::new((index / BOARD_SIZE) as u8, (index % BOARD_SIZE) as u8)
    }

    #[inline]
    pub const fn is_on_board(self) -> bool {
        self.row <= LAST_INDEX && self.col <= LAST_INDEX
    }

    /// Neighbouring cell in `direction`, or `None` past the edge.
    #[inline]
    pub fn step(self, direction: Direction) -> Option<Position> {
        let (row, col) = match direction {
            Direction::Left => (self.row, self.col.checked_sub(1)?),
            Direction::Top => (self.row.checked_sub(1)?, self.col),
            Direction::Right => (self.row, self.col + 1),
            Direction::Bottom => (self.row + 1, self.col),
        };
        let next = Position::new(row, col);
        next.is_on_board().then_some(next)
    }

    #[inline]
    pub fn manhattan_distance(self, other: Position) -> u32 {
        u32::from(self.row.abs_diff(other.row)) + u32::from(self.col.abs_diff(other.col))
    }

    #[inline]
    pub fn euclidean_distance(self, other: Position) -> f64 {
        let dr = f64::from(self.row.abs_diff(other.row));
        let dc = f64::from(self.col.abs_diff(other.col));
        (dr * dr + dc * dc).sqrt()
    }

    /// The up-to-four in-bounds cells touching this one at a corner.
    pub fn diagonal_neighbours(self) -> impl Iterator<Item = Position> {
        const OFFSETS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
        OFFSETS.into_iter().filter_map(move |(dr, dc)| {
            let row = self.row.checked_add_signed(dr)?;
            let col = self.col.checked_add_signed(dc)?;
            let pos = Position::new(row, col);
            pos.is_on_board().then_some(pos)
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Top,
    Right,
    Bottom,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Top,
        Direction::Right,
        Direction::Bottom,
    ];

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Top => Direction::Bottom,
            Direction::Right => Direction::Left,
            Direction::Bottom => Direction::Top,
        }
    }

    #[inline]
    pub const fn opening(self) -> Openings {
        match self {
            Direction::Left => Openings::LEFT,
            Direction::Top => Openings::TOP,
            Direction::Right => Openings::RIGHT,
            Direction::Bottom => Openings::BOTTOM,
        }
    }
}

bitflags! {
    /// Passable sides of a tile.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Openings: u8 {
        const LEFT = 1 << 0;
        const TOP = 1 << 1;
        const RIGHT = 1 << 2;
        const BOTTOM = 1 << 3;
    }
}

impl Openings {
    /// Straight passage, left to right.
    pub const STRAIGHT: Openings = Openings::LEFT.union(Openings::RIGHT);
    /// Corner joining the top and left sides.
    pub const CORNER: Openings = Openings::LEFT.union(Openings::TOP);
    /// Junction closed at the bottom.
    pub const T_JUNCTION: Openings = Openings::LEFT.union(Openings::TOP).union(Openings::RIGHT);

    #[inline]
    pub fn from_sides(left: bool, top: bool, right: bool, bottom: bool) -> Self {
        let mut openings = Openings::empty();
        openings.set(Openings::LEFT, left);
        openings.set(Openings::TOP, top);
        openings.set(Openings::RIGHT, right);
        openings.set(Openings::BOTTOM, bottom);
        openings
    }

    /// Clockwise rotation. Each quarter turn moves left→top→right→bottom→left,
    /// which on this bit layout is a 4-bit rotate-left.
    #[inline]
    pub fn rotated(self, rotation: Rotation) -> Self {
        let mut bits = self.bits();
        for _ in 0..rotation.quarter_turns() {
            bits = ((bits << 1) | (bits >> 3)) & 0x0F;
        }
        Openings::from_bits_truncate(bits)
    }
}

/// Clockwise rotation applied to the spare tile before insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    #[inline]
    pub const fn quarter_turns(self) -> u8 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 1,
            Rotation::Deg180 => 2,
            Rotation::Deg270 => 3,
        }
    }

    #[inline]
    pub const fn degrees(self) -> u16 {
        self.quarter_turns() as u16 * 90
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(format!("invalid rotation: {other} degrees")),
        }
    }
}

/// Set of player ids, one bit per id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PlayerSet(u8);

impl PlayerSet {
    pub const EMPTY: PlayerSet = PlayerSet(0);

    #[inline]
    fn bit(player: PlayerId) -> u8 {
        debug_assert!((1..=8).contains(&player), "player id out of range: {player}");
        1u8 << (player.wrapping_sub(1) & 7)
    }

    #[inline]
    pub fn single(player: PlayerId) -> Self {
        PlayerSet(Self::bit(player))
    }

    #[inline]
    pub fn contains(self, player: PlayerId) -> bool {
        self.0 & Self::bit(player) != 0
    }

    #[inline]
    pub fn with(self, player: PlayerId) -> Self {
        PlayerSet(self.0 | Self::bit(player))
    }

    #[inline]
    pub fn without(self, player: PlayerId) -> Self {
        PlayerSet(self.0 & !Self::bit(player))
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = PlayerId> {
        (1..=8u8).filter(move |p| self.contains(*p))
    }
}

impl FromIterator<PlayerId> for PlayerSet {
    fn from_iter<I: IntoIterator<Item = PlayerId>>(iter: I) -> Self {
        iter.into_iter().fold(PlayerSet::EMPTY, PlayerSet::with)
    }
}

/// Treasure ids: four home markers and twenty-four symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Treasure {
    Start01,
    Start02,
    Start03,
    Start04,
    Sym01,
    Sym02,
    Sym03,
    Sym04,
    Sym05,
    Sym06,
    Sym07,
    Sym08,
    Sym09,
    Sym10,
    Sym11,
    Sym12,
    Sym13,
    Sym14,
    Sym15,
    Sym16,
    Sym17,
    Sym18,
    Sym19,
    Sym20,
    Sym21,
    Sym22,
    Sym23,
    Sym24,
}

impl Treasure {
    pub const COUNT: usize = 28;

    pub const ALL: [Treasure; Treasure::COUNT] = [
        Treasure::Start01,
        Treasure::Start02,
        Treasure::Start03,
        Treasure::Start04,
        Treasure::Sym01,
        Treasure::Sym02,
        Treasure::Sym03,
        Treasure::Sym04,
        Treasure::Sym05,
        Treasure::Sym06,
        Treasure::Sym07,
        Treasure::Sym08,
        Treasure::Sym09,
        Treasure::Sym10,
        Treasure::Sym11,
        Treasure::Sym12,
        Treasure::Sym13,
        Treasure::Sym14,
        Treasure::Sym15,
        Treasure::Sym16,
        Treasure::Sym17,
        Treasure::Sym18,
        Treasure::Sym19,
        Treasure::Sym20,
        Treasure::Sym21,
        Treasure::Sym22,
        Treasure::Sym23,
        Treasure::Sym24,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The home marker a player must return to last.
    #[inline]
    pub fn home_of(player: PlayerId) -> Option<Self> {
        if (1..=MAX_PLAYERS as u8).contains(&player) {
            Self::from_index(usize::from(player) - 1)
        } else {
            None
        }
    }

    #[inline]
    pub fn home_player(self) -> Option<PlayerId> {
        self.is_home().then(|| self.index() as PlayerId + 1)
    }

    #[inline]
    pub const fn is_home(self) -> bool {
        self.index() < MAX_PLAYERS
    }

    /// Symbol treasures in id order.
    pub fn symbols() -> impl Iterator<Item = Treasure> {
        Self::ALL.into_iter().skip(MAX_PLAYERS)
    }

    /// Wire name (`Start01`, `sym07`, ...).
    pub fn name(self) -> String {
        let index = self.index();
        if self.is_home() {
            format!("Start{:02}", index + 1)
        } else {
            format!("sym{:02}", index + 1 - MAX_PLAYERS)
        }
    }
}

impl fmt::Display for Treasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Treasure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_number = |digits: &str| {
            digits
                .parse::<usize>()
                .map_err(|_| format!("invalid treasure name: {s}"))
        };

        let index = if let Some(digits) = s.strip_prefix("Start") {
            let n = parse_number(digits)?;
            if !(1..=MAX_PLAYERS).contains(&n) {
                return Err(format!("invalid treasure name: {s}"));
            }
            n - 1
        } else if let Some(digits) = s.strip_prefix("sym") {
            let n = parse_number(digits)?;
            if !(1..=Treasure::COUNT - MAX_PLAYERS).contains(&n) {
                return Err(format!("invalid treasure name: {s}"));
            }
            n - 1 + MAX_PLAYERS
        } else {
            return Err(format!("invalid treasure name: {s}"));
        };

        Treasure::from_index(index).ok_or_else(|| format!("invalid treasure name: {s}"))
    }
}

impl TryFrom<String> for Treasure {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Treasure> for String {
    fn from(treasure: Treasure) -> Self {
        treasure.name()
    }
}

/// Set of treasure ids, one bit per id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TreasureSet(u32);

impl TreasureSet {
    pub const EMPTY: TreasureSet = TreasureSet(0);

    #[inline]
    pub fn contains(self, treasure: Treasure) -> bool {
        self.0 & (1 << treasure.index()) != 0
    }

    #[inline]
    pub fn insert(&mut self, treasure: Treasure) -> bool {
        let fresh = !self.contains(treasure);
        self.0 |= 1 << treasure.index();
        fresh
    }

    #[inline]
    pub fn remove(&mut self, treasure: Treasure) -> bool {
        let present = self.contains(treasure);
        self.0 &= !(1 << treasure.index());
        present
    }

    #[inline]
    pub fn difference(self, other: TreasureSet) -> TreasureSet {
        TreasureSet(self.0 & !other.0)
    }

    #[inline]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Treasure> {
        Treasure::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl FromIterator<Treasure> for TreasureSet {
    fn from_iter<I: IntoIterator<Item = Treasure>>(iter: I) -> Self {
        let mut set = TreasureSet::EMPTY;
        for treasure in iter {
            set.insert(treasure);
        }
        set
    }
}

/// Insertion slot plus spare-tile rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShiftCandidate {
    pub slot: Position,
    pub rotation: Rotation,
}

impl ShiftCandidate {
    #[inline]
    pub const fn new(slot: Position, rotation: Rotation) -> Self {
        Self { slot, rotation }
    }
}

/// One complete turn: shift first, then walk the token to `destination`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveAction {
    pub destination: Position,
    pub shift: ShiftCandidate,
}

impl fmt::Display for MoveAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "shift {} rot {} -> move {}",
            self.shift.slot,
            self.shift.rotation.degrees(),
            self.destination
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_turn_rotates_sides_clockwise() {
        // (L,T,R,B) <- (B,L,T,R)
        assert_eq!(Openings::LEFT.rotated(Rotation::Deg90), Openings::TOP);
        assert_eq!(Openings::TOP.rotated(Rotation::Deg90), Openings::RIGHT);
        assert_eq!(Openings::RIGHT.rotated(Rotation::Deg90), Openings::BOTTOM);
        assert_eq!(Openings::BOTTOM.rotated(Rotation::Deg90), Openings::LEFT);
    }

    #[test]
    fn half_turn_swaps_opposite_sides() {
        assert_eq!(
            Openings::CORNER.rotated(Rotation::Deg180),
            Openings::RIGHT | Openings::BOTTOM
        );
        assert_eq!(Openings::STRAIGHT.rotated(Rotation::Deg180), Openings::STRAIGHT);
    }

    #[test]
    fn three_quarter_turn_matches_counter_clockwise() {
        // (L,T,R,B) <- (T,R,B,L)
        assert_eq!(Openings::TOP.rotated(Rotation::Deg270), Openings::LEFT);
        assert_eq!(Openings::LEFT.rotated(Rotation::Deg270), Openings::BOTTOM);
        assert_eq!(
            Openings::T_JUNCTION.rotated(Rotation::Deg270),
            Openings::LEFT | Openings::TOP | Openings::BOTTOM
        );
    }

    #[test]
    fn treasure_names_round_trip_through_strings() {
        assert_eq!(Treasure::Start03.name(), "Start03");
        assert_eq!(Treasure::Sym07.name(), "sym07");
        assert_eq!("sym24".parse::<Treasure>(), Ok(Treasure::Sym24));
        assert_eq!("Start01".parse::<Treasure>(), Ok(Treasure::Start01));
        assert!("sym25".parse::<Treasure>().is_err());
        assert!("Start05".parse::<Treasure>().is_err());
        assert!("gold".parse::<Treasure>().is_err());
    }

    #[test]
    fn home_treasures_map_to_players() {
        assert_eq!(Treasure::home_of(2), Some(Treasure::Start02));
        assert_eq!(Treasure::home_of(5), None);
        assert_eq!(Treasure::Start04.home_player(), Some(4));
        assert_eq!(Treasure::Sym01.home_player(), None);
        assert_eq!(Treasure::symbols().count(), 24);
    }

    #[test]
    fn player_set_tracks_membership() {
        let set = PlayerSet::single(2).with(4);
        assert!(set.contains(2) && set.contains(4));
        assert!(!set.contains(1));
        assert_eq!(set.len(), 2);
        assert_eq!(set.without(2).iter().collect::<Vec<_>>(), vec![4]);
    }

    #[test]
    fn position_steps_stop_at_the_edge() {
        let corner = Position::new(0, 0);
        assert_eq!(corner.step(Direction::Left), None);
        assert_eq!(corner.step(Direction::Top), None);
        assert_eq!(corner.step(Direction::Right), Some(Position::new(0, 1)));
        assert_eq!(Position::new(6, 6).step(Direction::Bottom), None);
        assert_eq!(corner.diagonal_neighbours().collect::<Vec<_>>(), vec![Position::new(1, 1)]);
        assert_eq!(Position::new(3, 3).diagonal_neighbours().count(), 4);
    }

    #[test]
    fn rotation_serializes_as_degrees() {
        let json = serde_json::to_string(&Rotation::Deg270).expect("rotation should serialize");
        assert_eq!(json, "270");
        let back: Rotation = serde_json::from_str("90").expect("rotation should parse");
        assert_eq!(back, Rotation::Deg90);
        assert!(serde_json::from_str::<Rotation>("45").is_err());
    }
}
