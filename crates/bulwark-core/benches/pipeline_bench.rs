use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gridiron::{Cell, GridMap};

use bulwark_core::config::{normalize, resolve_dependencies, Preset};
use bulwark_core::phase::{Phase, PhaseContext};
use bulwark_core::pipeline::Pipeline;
use bulwark_core::state::BattleState;
use bulwark_core::unit::{Team, Unit};
use bulwark_core::Battle;

fn line_roster(per_side: u64) -> Vec<Unit> {
    let mut units = Vec::new();
    for i in 0..per_side {
        units.push(Unit::melee(i + 1, Team::Red, Cell::new(1, i as i32 + 1)));
        units.push(Unit::melee(
            100 + i + 1,
            Team::Blue,
            Cell::new(18, i as i32 + 1),
        ));
    }
    units
}

fn bench_phase_fold(c: &mut Criterion) {
    let config = normalize(&resolve_dependencies(&Preset::Full.selection())).unwrap();
    let pipeline = Pipeline::from_config(&config).unwrap();
    let state = BattleState::new(line_roster(8), GridMap::new(20, 20));
    let ctx = PhaseContext::new(1.into(), 42);

    c.bench_function("phase_fold_turn_start", |b| {
        b.iter(|| pipeline.run(Phase::TurnStart, black_box(state.clone()), &ctx))
    });
}

fn bench_full_battle(c: &mut Criterion) {
    c.bench_function("full_battle_8v8", |b| {
        b.iter(|| {
            let mut battle = Battle::new(
                &Preset::Full.selection(),
                line_roster(8),
                GridMap::new(20, 20),
                black_box(42),
            )
            .unwrap();
            battle.run(50)
        })
    });
}

fn bench_legacy_battle(c: &mut Criterion) {
    // Baseline: empty pipeline, pure loop arithmetic.
    c.bench_function("legacy_battle_8v8", |b| {
        b.iter(|| {
            let mut battle = Battle::new(
                &Preset::Legacy.selection(),
                line_roster(8),
                GridMap::new(20, 20),
                black_box(42),
            )
            .unwrap();
            battle.run(50)
        })
    });
}

criterion_group!(benches, bench_phase_fold, bench_full_battle, bench_legacy_battle);
criterion_main!(benches);
