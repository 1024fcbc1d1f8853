use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::hint::black_box;

use banditsim::{
    initialize, run, BayesThompson, BernoulliModel, EpsilonGreedy, Exp3, Softmax, Ucb1,
};

fn bench_run(c: &mut Criterion) {
    let arms: Vec<String> = (0..5).map(|i| format!("arm-{i}")).collect();
    let env = BernoulliModel::new(
        arms.iter()
            .enumerate()
            .map(|(i, a)| (a.clone(), 0.1 + 0.15 * i as f64)),
    )
    .unwrap();
    let horizon = 1_000usize;

    let mut group = c.benchmark_group("run_1k_steps");

    group.bench_function("epsilon_greedy", |b| {
        let strat = EpsilonGreedy::new(0.1).unwrap();
        b.iter(|| {
            let reg = initialize(arms.clone()).unwrap();
            black_box(run(&env, &strat, reg, horizon, StdRng::seed_from_u64(0)).unwrap())
        })
    });

    group.bench_function("softmax", |b| {
        let strat = Softmax::new(0.2).unwrap();
        b.iter(|| {
            let reg = initialize(arms.clone()).unwrap();
            black_box(run(&env, &strat, reg, horizon, StdRng::seed_from_u64(0)).unwrap())
        })
    });

    group.bench_function("ucb1", |b| {
        let strat = Ucb1::new();
        b.iter(|| {
            let reg = initialize(arms.clone()).unwrap();
            black_box(run(&env, &strat, reg, horizon, StdRng::seed_from_u64(0)).unwrap())
        })
    });

    group.bench_function("exp3", |b| {
        let strat = Exp3::new(0.1).unwrap();
        b.iter(|| {
            let reg = initialize(arms.clone()).unwrap();
            black_box(run(&env, &strat, reg, horizon, StdRng::seed_from_u64(0)).unwrap())
        })
    });

    group.bench_function("thompson", |b| {
        let strat = BayesThompson::new();
        b.iter(|| {
            let reg = initialize(arms.clone()).unwrap();
            black_box(run(&env, &strat, reg, horizon, StdRng::seed_from_u64(0)).unwrap())
        })
    });

    group.finish();

    let mut scaling = c.benchmark_group("ucb1_arm_scaling");
    for k in [2usize, 5, 10] {
        scaling.bench_with_input(BenchmarkId::from_parameter(k), &k, |b, &k| {
            let arms: Vec<String> = (0..k).map(|i| format!("arm-{i}")).collect();
            let env =
                BernoulliModel::new(arms.iter().map(|a| (a.clone(), 0.5))).unwrap();
            let strat = Ucb1::new();
            b.iter(|| {
                let reg = initialize(arms.clone()).unwrap();
                black_box(run(&env, &strat, reg, horizon, StdRng::seed_from_u64(0)).unwrap())
            })
        });
    }
    scaling.finish();
}

criterion_group!(benches, bench_run);
criterion_main!(benches);
