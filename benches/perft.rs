use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use vulcan::controller::GameController;
use vulcan::engine::search::searcher::search_best_move;
use vulcan::game::board::BoardState;

fn perft_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft_starting_position");
    group.significance_level(0.1).sample_size(50);

    for depth in 1..=2 {
        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, &depth| {
            b.iter(|| {
                let mut controller = GameController::new();
                black_box(controller.perft(depth))
            });
        });
    }
    group.finish();

    let mut group = c.benchmark_group("search_starting_position");
    group.sample_size(10);

    let state = BoardState::new();
    for depth in 0..=1 {
        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, &depth| {
            b.iter(|| black_box(search_best_move(&state, state.side_to_move(), depth)));
        });
    }
    group.finish();
}

criterion_group!(benches, perft_benchmark);
criterion_main!(benches);
