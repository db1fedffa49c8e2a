//! Index-linked storage for lookahead chains.
//!
//! Each node records the shift that produced it, where the token went, and the
//! index of the node it extends. The arena is dropped after one search call.

use crate::game_state::board_state::BoardState;
use crate::game_state::maze_types::{MoveAction, Position, ShiftCandidate};

#[derive(Debug, Clone)]
pub struct PlyNode {
    pub shift: ShiftCandidate,
    /// Board after the shift and the token move.
    pub board: BoardState,
    pub destination: Position,
    pub parent: Option<usize>,
}

impl PlyNode {
    #[inline]
    pub fn action(&self) -> MoveAction {
        MoveAction {
            destination: self.destination,
            shift: self.shift,
        }
    }
}

#[derive(Debug, Default)]
pub struct PlyArena {
    nodes: Vec<PlyNode>,
}

impl PlyArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, node: PlyNode) -> usize {
        debug_assert!(node.parent.map_or(true, |p| p < self.nodes.len()));
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&PlyNode> {
        self.nodes.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node of the chain ending at `index`.
    pub fn root_of(&self, index: usize) -> Option<usize> {
        let mut current = index;
        loop {
            match self.nodes.get(current)?.parent {
                Some(parent) => current = parent,
                None => return Some(current),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::maze_types::Rotation;
    use crate::utils::maze_notation::BoardBuilder;

    #[test]
    fn chains_resolve_to_their_root() {
        let board = BoardBuilder::from_layout(&"fffffff/".repeat(7))
            .expect("layout should parse")
            .player(1, Position::new(0, 0))
            .build()
            .expect("board should build");
        let node = |slot: Position, parent| PlyNode {
            shift: ShiftCandidate::new(slot, Rotation::Deg0),
            board: board.clone(),
            destination: Position::new(2, 2),
            parent,
        };

        let mut arena = PlyArena::new();
        let root_a = arena.push(node(Position::new(0, 1), None));
        let root_b = arena.push(node(Position::new(0, 3), None));
        let leaf = arena.push(node(Position::new(5, 6), Some(root_b)));

        assert_eq!(arena.root_of(leaf), Some(root_b));
        assert_eq!(arena.root_of(root_a), Some(root_a));
        assert_eq!(arena.root_of(99), None);
        assert_eq!(
            arena.get(root_b).map(PlyNode::action).map(|a| a.shift.slot),
            Some(Position::new(0, 3))
        );
    }
}
