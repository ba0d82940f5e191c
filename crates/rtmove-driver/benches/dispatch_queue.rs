//! 分发队列性能基准测试
//!
//! 测试调用方入队路径（含驱逐）与投递线程取出路径的开销。

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rtmove_driver::{DispatchQueue, Envelope};
use rtmove_protocol::{Command, build_move_cartesian, build_move_cartesian_soft};

const POSE: [f64; 6] = [0.3, 0.0, 0.4, 0.0, 3.1, 0.0];

fn bench_try_enqueue_replace(c: &mut Criterion) {
    let queue: DispatchQueue<Command> = DispatchQueue::new(1);
    queue.try_enqueue(build_move_cartesian(&POSE));

    c.bench_function("dispatch_queue_try_enqueue_replace", |b| {
        b.iter(|| {
            black_box(queue.try_enqueue(build_move_cartesian(black_box(&POSE))));
        });
    });
}

fn bench_enqueue_take(c: &mut Criterion) {
    let queue: DispatchQueue<Command> = DispatchQueue::new(1);

    c.bench_function("dispatch_queue_enqueue_take", |b| {
        b.iter(|| {
            queue.try_enqueue(build_move_cartesian_soft(black_box(&POSE), 0.01));
            if let Envelope::Command(command) = queue.take() {
                black_box(command);
            }
        });
    });
}

fn bench_build_command(c: &mut Criterion) {
    c.bench_function("build_move_cartesian", |b| {
        b.iter(|| {
            black_box(build_move_cartesian(black_box(&POSE)));
        });
    });
}

criterion_group!(
    benches,
    bench_try_enqueue_replace,
    bench_enqueue_take,
    bench_build_command
);
criterion_main!(benches);
