use criterion::{Criterion, criterion_group, criterion_main};
use rgsm_frontend::models::{Game, SaveUnit, SaveUnitType};
use rgsm_frontend::services::{copy_missing_paths, needs_reconciliation, source_candidates};
use std::hint::black_box;

/// A game with many save units recorded on many devices, none on `current`
fn large_game(units: usize, devices: usize) -> Game {
    let mut game = Game::new("Bench");
    for u in 0..units {
        let mut unit = SaveUnit::new(SaveUnitType::Folder);
        for d in 0..devices {
            unit = unit.with_path(format!("device-{}", d), format!("/saves/{}/{}", d, u));
        }
        game.save_paths.push(unit);
    }
    for d in 0..devices {
        game.game_paths
            .insert(format!("device-{}", d), format!("/games/{}", d));
    }
    game
}

fn bench_reconcile(c: &mut Criterion) {
    let game = large_game(64, 16);

    c.bench_function("needs_reconciliation", |b| {
        b.iter(|| needs_reconciliation(black_box(&game), "current"))
    });

    c.bench_function("source_candidates", |b| {
        b.iter(|| source_candidates(black_box(&game), "current"))
    });

    c.bench_function("copy_missing_paths", |b| {
        b.iter_batched(
            || game.clone(),
            |mut game| copy_missing_paths(&mut game, "device-7", "current"),
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_reconcile);
criterion_main!(benches);
