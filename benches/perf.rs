use std::collections::BTreeMap;

use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;

use wc26_draw::draw::{perform_championship_draw, perform_standard_draw};
use wc26_draw::nations::NationRegistry;
use wc26_draw::presets;
use wc26_draw::schedule::{schedule_competition, schedule_group};

fn team_names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("Team {i}")).collect()
}

fn bench_schedule_group(c: &mut Criterion) {
    let teams = team_names(20);
    c.bench_function("schedule_group_20_double", |b| {
        b.iter(|| {
            let schedule = schedule_group(black_box(&teams), true);
            black_box(schedule.len());
        })
    });
}

fn bench_schedule_competition(c: &mut Criterion) {
    let groups: BTreeMap<String, Vec<String>> = (0..12)
        .map(|g| {
            let teams = (0..4).map(|i| format!("{g}-{i}")).collect();
            (format!("{g}"), teams)
        })
        .collect();
    c.bench_function("schedule_competition_12x4", |b| {
        b.iter(|| {
            let schedule = schedule_competition(black_box(&groups), false);
            black_box(schedule.len());
        })
    });
}

fn bench_standard_draw(c: &mut Criterion) {
    let registry = NationRegistry::builtin().expect("builtin registry");
    let setup = presets::find_preset("euro")
        .expect("euro preset")
        .setup(registry)
        .expect("euro setup");
    let mut rng = StdRng::seed_from_u64(11);
    c.bench_function("standard_draw_euro", |b| {
        b.iter(|| {
            let outcome = perform_standard_draw(&setup.pots, setup.empty_groups(), &mut rng);
            black_box(outcome.placed_count());
        })
    });
}

fn bench_championship_draw(c: &mut Criterion) {
    let registry = NationRegistry::builtin().expect("builtin registry");
    let setup = presets::find_preset("wc2026")
        .expect("wc2026 preset")
        .setup(registry)
        .expect("wc2026 setup");
    let mut rng = StdRng::seed_from_u64(26);
    c.bench_function("championship_draw_wc2026", |b| {
        b.iter(|| {
            let outcome = perform_championship_draw(&setup.pots, setup.empty_groups(), &mut rng);
            black_box(outcome.success);
        })
    });
}

criterion_group!(
    perf,
    bench_schedule_group,
    bench_schedule_competition,
    bench_standard_draw,
    bench_championship_draw
);
criterion_main!(perf);
