use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use limb_arbiter_core::{
    AcceptAllSink, AnimationState, AnimationStateRegistry, AppendageId, Arbiter, CombatSnapshot,
    Engine, EngineConfig, Inputs, MovementSnapshot, SourcesConfig, TransitionRequest,
};

fn tick_inputs(frame: usize) -> Inputs {
    Inputs {
        movement: Some(MovementSnapshot {
            speed: (frame % 7) as f32,
            airborne: frame % 31 == 0,
            ..Default::default()
        }),
        combat: Some(CombatSnapshot {
            hand: AppendageId::RIGHT,
            shotgun_fired: frame % 5 == 0,
            beam_held: frame % 40 > 30,
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn bench_engine_update(c: &mut Criterion) {
    let registry = Arc::new(AnimationStateRegistry::default());
    let mut group = c.benchmark_group("engine_update");
    for avatars in [1usize, 16, 128] {
        group.bench_with_input(BenchmarkId::from_parameter(avatars), &avatars, |b, &n| {
            let mut engines: Vec<Engine> = (0..n)
                .map(|_| {
                    Engine::with_default_sources(
                        Arc::clone(&registry),
                        EngineConfig::default(),
                        &SourcesConfig::default(),
                        0.0,
                    )
                })
                .collect();
            let mut sink = AcceptAllSink;
            let mut frame = 0usize;
            b.iter(|| {
                frame += 1;
                let now = frame as f64 / 60.0;
                for engine in &mut engines {
                    let out = engine.update(now, tick_inputs(frame), &mut sink);
                    black_box(out.events.len());
                }
            });
        });
    }
    group.finish();
}

fn bench_request_transition(c: &mut Criterion) {
    let registry = Arc::new(AnimationStateRegistry::default());
    c.bench_function("request_transition_mixed", |b| {
        let mut arbiter = Arbiter::new(Arc::clone(&registry), 0.0);
        let mut sink = AcceptAllSink;
        let mut i = 0usize;
        b.iter(|| {
            i += 1;
            let state = AnimationState::ALL[i % AnimationState::ALL.len()];
            let req = TransitionRequest::new(AppendageId::ALL[i % 2], state, i as f64 * 0.01);
            let _ = black_box(arbiter.request_transition(req, &mut sink));
            if i % 9 == 0 {
                arbiter.force_idle(i as f64 * 0.01);
            }
        });
    });
}

criterion_group!(benches, bench_engine_update, bench_request_transition);
criterion_main!(benches);
