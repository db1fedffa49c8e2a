use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;

use labyrinth_engine::game_state::board_state::BoardState;
use labyrinth_engine::move_generation::reachability::reachable_from_player;
use labyrinth_engine::move_generation::shift_generator::generate_shifted_boards;
use labyrinth_engine::search::move_search::{search_best_move, SearchConfig};
use labyrinth_engine::tracking::treasure_tracker::TreasureTracker;
use labyrinth_engine::utils::match_harness::MatchReferee;

const DEAL_SEEDS: &[u64] = &[1, 7, 42];

fn dealt_board(seed: u64, players: usize) -> BoardState {
    let mut rng = StdRng::seed_from_u64(seed);
    MatchReferee::deal(players, &mut rng)
        .expect("benchmark deal should succeed")
        .board_for_current()
        .expect("benchmark board should build")
}

fn bench_shift_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("shift_generation");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    for seed in DEAL_SEEDS {
        let board = dealt_board(*seed, 4);
        // Correctness guard before benchmarking.
        assert_eq!(generate_shifted_boards(&board, None).len(), 48);

        group.throughput(Throughput::Elements(48));
        group.bench_with_input(BenchmarkId::from_parameter(seed), &board, |b, board| {
            b.iter(|| black_box(generate_shifted_boards(black_box(board), None).len()));
        });
    }

    group.finish();
}

fn bench_reachability(c: &mut Criterion) {
    let mut group = c.benchmark_group("reachability");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    for seed in DEAL_SEEDS {
        let shifted = generate_shifted_boards(&dealt_board(*seed, 4), None);
        group.throughput(Throughput::Elements(shifted.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(seed), &shifted, |b, shifted| {
            b.iter(|| {
                shifted
                    .iter()
                    .map(|s| reachable_from_player(black_box(&s.board), 1).len())
                    .sum::<usize>()
            });
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_best_move");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(20);

    for seed in DEAL_SEEDS {
        let board = dealt_board(*seed, 2);
        group.bench_with_input(BenchmarkId::from_parameter(seed), &board, |b, board| {
            let mut rng = StdRng::seed_from_u64(*seed);
            b.iter(|| {
                let mut tracker = TreasureTracker::new();
                let outcome =
                    search_best_move(black_box(board), &mut tracker, &mut rng, SearchConfig::default())
                        .expect("search benchmark run should succeed");
                black_box(outcome.action)
            });
        });
    }

    group.finish();
}

criterion_group!(search_benches, bench_shift_generation, bench_reachability, bench_search);
criterion_main!(search_benches);
