use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use finite_state_machines::{prelude::*, random};

fn avoiding_machines() -> Vec<Fsm> {
    let alphabet = Alphabet::of_size(3);
    ["aba", "bcb", "cc", "abca", "bab", "cabc"]
        .into_iter()
        .map(|pattern| Fsm::fsm_for_words_avoiding(pattern.chars(), Some(&alphabet)))
        .collect()
}

fn counting(c: &mut Criterion) {
    let mut group = c.benchmark_group("counting");
    let mut rng = fastrand::Rng::with_seed(42);
    let fsm = random::random_sprout_fsm(&mut rng, 3, 0.1);
    let wfsm = random::random_wfsm(&mut rng, 3, 40, 0.9, 4);
    for length in [16, 64, 256] {
        group.bench_with_input(BenchmarkId::new("smart", length), &length, |b, &length| {
            b.iter(|| black_box(fsm.smart_enumeration(length)))
        });
        group.bench_with_input(BenchmarkId::new("weighted", length), &length, |b, &length| {
            b.iter(|| black_box(wfsm.smart_enumeration(length)))
        });
    }
    group.bench_function("words_generated", |b| {
        b.iter(|| {
            let fresh = fsm.clone();
            black_box(fresh.words_generated(8))
        })
    });
    group.finish();
}

fn products(c: &mut Criterion) {
    let machines = avoiding_machines();
    let mut group = c.benchmark_group("products");
    group.bench_function("balanced", |b| {
        b.iter(|| black_box(Fsm::intersection_of_list(&machines, true)))
    });
    group.bench_function("linear", |b| {
        b.iter(|| black_box(Fsm::slower_intersection_of_list(&machines)))
    });
    group.bench_function("union", |b| {
        b.iter(|| black_box(machines[0].union(&machines[1])))
    });
    group.finish();
}

fn minimization(c: &mut Criterion) {
    let mut group = c.benchmark_group("minimize");
    for size in [50, 200, 800] {
        let mut rng = fastrand::Rng::with_seed(size as u64);
        let fsm = random::random_fsm(&mut rng, 4, size, 1.0);
        let wfsm = random::random_wfsm(&mut rng, 4, size, 0.9, 3);
        group.bench_with_input(BenchmarkId::new("hopcroft", size), &fsm, |b, fsm| {
            b.iter(|| black_box(fsm.minimize(false)))
        });
        group.bench_with_input(BenchmarkId::new("weighted", size), &wfsm, |b, wfsm| {
            b.iter(|| black_box(wfsm.minimize(false)))
        });
    }
    group.finish();
}

criterion_group!(benches, counting, products, minimization);
criterion_main!(benches);
