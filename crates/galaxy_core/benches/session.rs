//! Session benchmarks for galaxy_core.
//!
//! Run with: `cargo bench -p galaxy_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use galaxy_core::config::GameConfig;
use galaxy_core::data::Catalog;
use galaxy_core::math::Fixed;
use galaxy_core::session::Session;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn started_session() -> (Session, StdRng) {
    let mut session = match Session::new(GameConfig::default(), Arc::new(Catalog::default())) {
        Ok(session) => session,
        Err(e) => panic!("default session failed to build: {e}"),
    };
    session.on_start_trigger();
    (session, StdRng::seed_from_u64(42))
}

/// One simulated minute at 60 Hz, firing every fifth of a second.
pub fn session_benchmark(c: &mut Criterion) {
    let dt = Fixed::ONE / Fixed::from_num(60);

    c.bench_function("session_minute", |b| {
        b.iter_batched(
            started_session,
            |(mut session, mut rng)| {
                for tick in 0..3600u32 {
                    session.tick(dt, &mut rng);
                    if tick % 12 == 0 {
                        black_box(session.fire());
                    }
                }
                black_box(session.state_hash())
            },
            BatchSize::SmallInput,
        );
    });

    c.bench_function("state_hash", |b| {
        let (mut session, mut rng) = started_session();
        for _ in 0..600 {
            session.tick(dt, &mut rng);
        }
        b.iter(|| black_box(session.state_hash()));
    });
}

criterion_group!(benches, session_benchmark);
criterion_main!(benches);
