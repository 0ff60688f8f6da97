// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_timeline::Timeline;

fn build_waits(chains: usize) -> Timeline<u64> {
    let mut timeline = Timeline::new();
    for i in 0..chains {
        timeline
            .wait(0.001 * (i % 7) as f64)
            .invoke(|cx| *cx.target += 1)
            .wait(0.5);
    }
    timeline
}

fn build_repeats(chains: usize) -> Timeline<u64> {
    let mut timeline = Timeline::new();
    for _ in 0..chains {
        timeline.repeat(1.0e6, |cx, status| *cx.target += u64::from(status.event_count));
    }
    timeline
}

fn bench_wait_invoke(c: &mut Criterion) {
    let mut group = c.benchmark_group("wait_invoke");
    for &n in &[64usize, 1024, 8192] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("drain_n{}", n), |b| {
            b.iter_batched(
                || build_waits(n),
                |mut timeline| {
                    let mut fired = 0_u64;
                    while !timeline.is_empty() {
                        timeline.update(1.0 / 60.0, &mut fired);
                    }
                    black_box(fired);
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_repeat_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("repeat");
    for &n in &[64usize, 1024, 8192] {
        let mut timeline = build_repeats(n);
        let mut sum = 0_u64;
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("frame_n{}", n), |b| {
            b.iter(|| {
                timeline.update(1.0 / 60.0, &mut sum);
                black_box(sum);
            })
        });
    }
    group.finish();
}

fn bench_spawn_from_callback(c: &mut Criterion) {
    let mut group = c.benchmark_group("spawn");
    group.bench_function("invoke_fanout_256", |b| {
        b.iter_batched(
            || {
                let mut timeline: Timeline<u64> = Timeline::new();
                timeline.invoke(|cx| {
                    for _ in 0..256 {
                        cx.timeline().invoke(|cx| *cx.target += 1);
                    }
                });
                timeline
            },
            |mut timeline| {
                let mut fired = 0_u64;
                timeline.update(0.0, &mut fired);
                black_box(fired);
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_wait_invoke,
    bench_repeat_frame,
    bench_spawn_from_callback,
);
criterion_main!(benches);
