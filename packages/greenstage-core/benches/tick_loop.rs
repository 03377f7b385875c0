use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use criterion::{criterion_group, criterion_main, Criterion};

use greenstage_core::{GameClock, Scheduler};

fn bench_empty_tick(c: &mut Criterion) {
    let sched = Scheduler::new(Arc::new(GameClock::new()));
    c.bench_function("empty_tick", |b| b.iter(|| sched.process_tick()));
}

fn bench_frame_waiter_tick(c: &mut Criterion) {
    const TASKS: usize = 64;
    let sched = Scheduler::new(Arc::new(GameClock::new()));
    for _ in 0..TASKS {
        let sched2 = Arc::clone(&sched);
        sched.create(None, move |_| loop {
            sched2.wait_next_frame();
        });
    }
    // Let every task reach its first suspension point before measuring.
    let deadline = Instant::now() + Duration::from_secs(10);
    while sched.queued_entries() < TASKS {
        assert!(Instant::now() < deadline, "tasks never parked");
        thread::yield_now();
    }

    c.bench_function("frame_waiter_tick_64", |b| {
        b.iter(|| {
            sched.process_tick();
            sched.clock().advance(0.016);
        })
    });

    sched.shutdown();
}

criterion_group!(benches, bench_empty_tick, bench_frame_waiter_tick);
criterion_main!(benches);
