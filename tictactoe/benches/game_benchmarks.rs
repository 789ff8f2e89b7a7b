use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use std::collections::BTreeSet;
use std::hint::black_box;

use tictactoe::game::{Cell, GameSession, PlayerName, rules};

fn claimed_set(labels: &[u8]) -> BTreeSet<Cell> {
    labels
        .iter()
        .map(|&label| Cell::new(label).unwrap())
        .collect()
}

fn benchmark_win_detection(c: &mut Criterion) {
    let winning = claimed_set(&[4, 5, 6]);
    let losing = claimed_set(&[1, 2, 4, 6]);

    c.bench_function("win_detection_hit", |b| {
        b.iter(|| rules::has_won(black_box(&winning)));
    });

    c.bench_function("win_detection_miss", |b| {
        b.iter(|| rules::has_won(black_box(&losing)));
    });
}

fn benchmark_win_detection_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("win_detection_by_set_size");
    // growing non-winning sets, worst case for the exhaustive check
    let labels = [2u8, 4, 6, 8, 1];
    for size in 1..=labels.len() {
        let claimed = claimed_set(&labels[..size]);
        group.bench_with_input(BenchmarkId::from_parameter(size), &claimed, |b, claimed| {
            b.iter(|| rules::has_won(black_box(claimed)));
        });
    }
    group.finish();
}

fn benchmark_apply_move(c: &mut Criterion) {
    let guest = PlayerName::new("guest");

    c.bench_function("apply_single_move", |b| {
        b.iter_batched(
            || GameSession::new(PlayerName::new("host"), PlayerName::new("guest")),
            |mut session| session.apply_move(&guest, black_box(5)).unwrap(),
            BatchSize::SmallInput,
        );
    });
}

fn benchmark_full_game(c: &mut Criterion) {
    let host = PlayerName::new("host");
    let guest = PlayerName::new("guest");

    let win_script = [5u8, 1, 6, 7, 4];
    c.bench_function("five_move_win", |b| {
        b.iter_batched(
            || GameSession::new(host.clone(), guest.clone()),
            |mut session| {
                for (i, cell) in win_script.iter().enumerate() {
                    let actor = if i % 2 == 0 { &guest } else { &host };
                    session.apply_move(actor, *cell).unwrap();
                }
                session
            },
            BatchSize::SmallInput,
        );
    });

    let tie_script = [1u8, 3, 2, 4, 6, 5, 7, 8, 9];
    c.bench_function("nine_move_tie", |b| {
        b.iter_batched(
            || GameSession::new(host.clone(), guest.clone()),
            |mut session| {
                for (i, cell) in tie_script.iter().enumerate() {
                    let actor = if i % 2 == 0 { &guest } else { &host };
                    session.apply_move(actor, *cell).unwrap();
                }
                session
            },
            BatchSize::SmallInput,
        );
    });
}

fn benchmark_snapshot(c: &mut Criterion) {
    let mut session = GameSession::new(PlayerName::new("host"), PlayerName::new("guest"));
    let guest = PlayerName::new("guest");
    let host = PlayerName::new("host");
    session.apply_move(&guest, 5).unwrap();
    session.apply_move(&host, 1).unwrap();

    c.bench_function("session_snapshot", |b| {
        b.iter(|| black_box(&session).view());
    });
}

criterion_group!(
    rules_benches,
    benchmark_win_detection,
    benchmark_win_detection_scaling
);
criterion_group!(
    session_benches,
    benchmark_apply_move,
    benchmark_full_game,
    benchmark_snapshot
);
criterion_main!(rules_benches, session_benches);
