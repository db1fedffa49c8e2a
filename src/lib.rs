//! Crate root module declarations for the Labyrinth engine project.
//!
//! This file exposes the top-level subsystems (game state, shift and
//! reachability generation, search, treasure tracking, engines, the turn
//! protocol, and utility helpers) so binaries, benches, and tests can import
//! stable module paths.

pub mod config;

pub mod game_state {
    pub mod board_state;
    pub mod maze_errors;
    pub mod maze_rules;
    pub mod maze_types;
    pub mod tile;
}

pub mod move_generation {
    pub mod reachability;
    pub mod shift_generator;
}

pub mod search {
    pub mod board_scoring;
    pub mod move_search;
    pub mod opponent_blocking;
    pub mod ply_arena;
    pub mod two_ply_lookahead;
}

pub mod tracking {
    pub mod treasure_tracker;
}

pub mod engines {
    pub mod engine_greedy;
    pub mod engine_random;
    pub mod engine_search;
    pub mod engine_trait;
}

pub mod protocol {
    pub mod session;
    pub mod turn_payload;
}

pub mod utils {
    pub mod match_harness;
    pub mod maze_notation;
    pub mod render_board;
}
