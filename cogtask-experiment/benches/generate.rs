use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;
use std::time::Duration;

use cogtask_core::{Paradigm, ResponseEvent};
use cogtask_experiment::{
    Dispatch, FlankerConfig, NBackConfig, SequenceGenerator, Session, StroopConfig, TaskConfig,
    summarize,
};
use cogtask_timing::ManualTimer;

/// Sequence generation at default and enlarged sizes.
pub fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    group
        .sample_size(50)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1));

    for scale in [1usize, 10, 100] {
        let flanker = FlankerConfig {
            trials_per_stimulus: 5 * scale,
        };
        group.bench_with_input(BenchmarkId::new("flanker", scale), &flanker, |b, cfg| {
            let mut rng = StdRng::seed_from_u64(7);
            b.iter(|| black_box(cfg.generate_trials(&mut rng)));
        });

        let stroop = StroopConfig {
            congruent_trials: 20 * scale,
            incongruent_trials: 20 * scale,
        };
        group.bench_with_input(BenchmarkId::new("stroop", scale), &stroop, |b, cfg| {
            let mut rng = StdRng::seed_from_u64(7);
            b.iter(|| black_box(cfg.generate_trials(&mut rng)));
        });

        let nback = NBackConfig {
            total_trials: 30 * scale,
            ..NBackConfig::default()
        };
        group.bench_with_input(BenchmarkId::new("nback", scale), &nback, |b, cfg| {
            let mut rng = StdRng::seed_from_u64(7);
            b.iter(|| black_box(cfg.generate_trials(&mut rng)));
        });
    }

    group.finish();
}

/// A whole default flanker run: start, every dispatch and response, summary.
pub fn bench_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");
    group.sample_size(50);

    group.bench_function("flanker_full_run", |b| {
        b.iter_batched(
            || {
                Session::new(
                    Paradigm::Flanker,
                    ManualTimer::new(),
                    StdRng::seed_from_u64(11),
                )
                .unwrap()
            },
            |mut session| {
                session
                    .start(&TaskConfig::Flanker(FlankerConfig::default()))
                    .unwrap();
                while let Dispatch::Next(payload) = session.next_trial().unwrap() {
                    let choice = payload.stimulus.correct_choice().unwrap_or("left");
                    session
                        .record_response(ResponseEvent::respond(choice, 400.0))
                        .unwrap();
                }
                black_box(summarize(session.descriptor, session.results()).unwrap())
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .confidence_level(0.95)
        .noise_threshold(0.02)
        .significance_level(0.05);
    targets = bench_generate, bench_session
}

criterion_main!(benches);
