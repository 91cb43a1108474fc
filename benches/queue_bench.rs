//! Benchmarks for the load scheduler.
//!
//! Benchmarks cover:
//! - Ready queue operations (push/pop/priority ordering/removal)
//! - Priority scoring
//! - End-to-end registration and dispatch

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::time::Duration;

use prometheus_load_scheduler::config::GlobalConfig;
use prometheus_load_scheduler::core::{
    ActivityMonitor, Importance, LoadFailure, LoaderFn, PriorityScorer, ReadyQueue, Scheduler,
    TaskDeclaration, Trigger,
};
use prometheus_load_scheduler::runtime::TokioSpawner;

use rand::Rng;
use tokio::runtime::Runtime;

const IMPORTANCE: [Importance; 4] = [
    Importance::Low,
    Importance::Medium,
    Importance::High,
    Importance::Critical,
];

fn declaration(id: u64, importance: Importance, cost_ms: u64) -> TaskDeclaration {
    TaskDeclaration::new(
        format!("task-{id}"),
        importance,
        Trigger::Immediate,
        Duration::from_millis(cost_ms),
    )
}

// ============================================================================
// Ready Queue
// ============================================================================

fn bench_queue_push_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_push_pop");

    for size in [10_u64, 100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut rng = rand::rng();
            let priorities: Vec<f64> = (0..size).map(|_| rng.random_range(0.0..200.0)).collect();
            b.iter(|| {
                let mut queue = ReadyQueue::new();
                for (i, priority) in priorities.iter().enumerate() {
                    queue.push(format!("task-{i}"), *priority);
                }
                while let Some(entry) = queue.pop() {
                    black_box(entry);
                }
            });
        });
    }
    group.finish();
}

fn bench_queue_equal_priority_fifo(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_equal_priority_fifo");

    for size in [100_u64, 1_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut queue = ReadyQueue::new();
                for i in 0..size {
                    queue.push(format!("task-{i}"), 50.0);
                }
                black_box(queue.snapshot());
            });
        });
    }
    group.finish();
}

fn bench_queue_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_remove");

    for size in [100_u64, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut queue = ReadyQueue::new();
                for i in 0..size {
                    queue.push(format!("task-{i}"), (i % 7) as f64);
                }
                for i in (0..size).step_by(10) {
                    black_box(queue.remove(&format!("task-{i}")));
                }
            });
        });
    }
    group.finish();
}

// ============================================================================
// Priority Scoring
// ============================================================================

fn bench_priority_score(c: &mut Criterion) {
    let scorer = PriorityScorer::default();
    let mut rng = rand::rng();
    let declarations: Vec<TaskDeclaration> = (0..1_000)
        .map(|i| {
            declaration(
                i,
                IMPORTANCE[rng.random_range(0..IMPORTANCE.len())],
                rng.random_range(1..2_000),
            )
        })
        .collect();

    c.bench_function("priority_score_1000", |b| {
        b.iter(|| {
            for (i, decl) in declarations.iter().enumerate() {
                black_box(scorer.score(decl, (i % 12) as f64));
            }
        });
    });
}

// ============================================================================
// End-to-end Scheduling
// ============================================================================

fn bench_register_and_drain(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("register_and_drain");

    for task_count in [10_u64, 100] {
        group.throughput(Throughput::Elements(task_count));
        group.bench_with_input(
            BenchmarkId::from_parameter(task_count),
            &task_count,
            |b, &task_count| {
                b.to_async(&rt).iter(|| async move {
                    let scheduler = Scheduler::new(
                        GlobalConfig {
                            max_concurrent_loads: 4,
                            ..GlobalConfig::default()
                        },
                        LoaderFn::new(|_id: String| async move { Ok::<(), LoadFailure>(()) }),
                        ActivityMonitor::default(),
                        TokioSpawner::current(),
                    )
                    .expect("valid scheduler");

                    for i in 0..task_count {
                        scheduler
                            .register(declaration(i, IMPORTANCE[(i % 4) as usize], 10 + i))
                            .expect("register");
                    }
                    while scheduler.metrics().loaded_components < task_count as usize {
                        tokio::task::yield_now().await;
                    }
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    queue_benches,
    bench_queue_push_pop,
    bench_queue_equal_priority_fifo,
    bench_queue_remove
);
criterion_group!(scoring_benches, bench_priority_score);
criterion_group!(scheduler_benches, bench_register_and_drain);
criterion_main!(queue_benches, scoring_benches, scheduler_benches);
