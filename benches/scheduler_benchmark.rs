//! Scheduler performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use reactor_sched::{EventQueue, Reaction, Runtime, SchedulerConfig, Tag};

fn run_program(num_workers: usize, max_level: usize, tags: i64, reactions_per_tag: u32) {
    let mut events = EventQueue::new();
    for time in 0..tags {
        for i in 0..reactions_per_tag {
            let level = i % (max_level as u32 + 1);
            let r = Reaction::new(format!("r{time}-{i}"), level, |_| {
                black_box(0u64);
            });
            events.schedule(Tag::at(time), r);
        }
    }

    let config = SchedulerConfig {
        num_workers,
        max_level,
        ..Default::default()
    };
    let runtime = Runtime::with_config(config, Box::new(events)).unwrap();
    runtime.run().unwrap();
}

fn bench_tag_turnover(c: &mut Criterion) {
    c.bench_function("tag_turnover_100x1", |b| {
        b.iter(|| run_program(2, 0, 100, 1));
    });
}

fn bench_level_fanout(c: &mut Criterion) {
    c.bench_function("level_fanout_1x256", |b| {
        b.iter(|| run_program(4, 3, 1, 256));
    });
}

criterion_group!(benches, bench_tag_turnover, bench_level_fanout);
criterion_main!(benches);
