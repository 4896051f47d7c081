use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;

use shashki::bit_board::BitBoard;
use shashki::engine::{best_move, random_move_with_rng};
use shashki::game::Game;
use shashki::move_generation::{generate_moves_for_game, generate_moves_for_side};
use shashki::side::Side;

const MOVE_GENERATION_BOARDS: usize = 10_000;

/// Plays random games from the starting position and collects the boards
/// along the way, restarting whenever a game runs out of moves. Seeded so
/// every benchmark run times the same position pool.
fn random_bit_board_pool(count: usize) -> Vec<BitBoard> {
    let mut rng = StdRng::seed_from_u64(0x5A5A_2024);
    let mut pool = Vec::with_capacity(count);
    let mut game = Game::default();

    while pool.len() < count {
        if generate_moves_for_game(&game).is_empty() {
            game = Game::default();
        }
        let next_move =
            random_move_with_rng(&game, &mut rng).expect("a playable game always has a move");
        game.execute_move(&next_move);
        pool.push(game.bit_board());
    }

    pool
}

fn bench_move_generation(c: &mut Criterion) {
    // Correctness guard before timing anything.
    assert_eq!(
        generate_moves_for_side(&BitBoard::default(), Side::White).len(),
        7
    );

    let pool = random_bit_board_pool(MOVE_GENERATION_BOARDS);

    let mut group = c.benchmark_group("move_generation");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(4));
    group.throughput(Throughput::Elements(pool.len() as u64));

    group.bench_function("generate_moves_for_side", |b| {
        b.iter(|| {
            let mut generated_moves = 0usize;
            for bit_board in &pool {
                generated_moves += generate_moves_for_side(black_box(bit_board), Side::White).len();
            }
            black_box(generated_moves)
        })
    });

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let game = Game::default();

    let mut group = c.benchmark_group("search");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(4));
    group.sample_size(20);

    for depth in [3usize, 6, 9] {
        group.bench_with_input(
            BenchmarkId::new("best_move", depth),
            &depth,
            |b, &depth| {
                b.iter(|| {
                    best_move(black_box(&game), depth)
                        .expect("the starting position has legal moves")
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_move_generation, bench_search);
criterion_main!(benches);
