//! Benchmarks for the run tracker, splits and daily analytics
//!
//! Run with: cargo bench

use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use fitlog::storage::Store;
use fitlog_core::models::{NewFoodEntry, NewMeal, NewRun};
use fitlog_core::splits::compute_splits;
use fitlog_core::tracking::{MotionSample, PositionSample, RoutePoint, TrackerSession};

/// A straight line heading north, roughly 5.5 m between samples
fn create_test_samples(count: usize) -> Vec<PositionSample> {
    (0..count)
        .map(|i| PositionSample {
            latitude: 51.5 + i as f64 * 0.00005,
            longitude: -0.12,
            altitude: Some(10.0 + (i % 20) as f64),
            accuracy: 8.0,
            timestamp: 1_700_000_000.0 + i as f64,
        })
        .collect()
}

fn create_test_route(count: usize) -> Vec<RoutePoint> {
    create_test_samples(count)
        .iter()
        .map(|s| RoutePoint(s.latitude, s.longitude, s.altitude.unwrap_or(0.0), s.timestamp))
        .collect()
}

fn bench_tracker(c: &mut Criterion) {
    let mut group = c.benchmark_group("tracker");

    for size in [100, 1000, 10000] {
        let samples = create_test_samples(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("positions_{}", size), |b| {
            b.iter(|| {
                let mut session = TrackerSession::new();
                for sample in &samples {
                    session.on_position(black_box(sample));
                }
                session.distance_meters()
            })
        });
    }

    group.bench_function("motion_1000", |b| {
        let samples: Vec<MotionSample> = (0..1000)
            .map(|i| MotionSample::new(0.0, if i % 2 == 0 { 30.0 } else { 5.0 }, 0.0))
            .collect();

        b.iter(|| {
            let mut session = TrackerSession::new();
            for sample in &samples {
                session.on_motion(black_box(sample));
            }
            session.steps()
        })
    });

    group.finish();
}

fn bench_splits(c: &mut Criterion) {
    let mut group = c.benchmark_group("splits");

    for size in [1000, 10000] {
        let route = create_test_route(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("compute_{}", size), |b| {
            b.iter(|| compute_splits(black_box(&route)))
        });
    }

    group.finish();
}

fn bench_analytics(c: &mut Criterion) {
    let mut group = c.benchmark_group("analytics");

    let store = Store::open_in_memory().unwrap();
    let now = Utc::now();
    for day in 0..90 {
        let at = now - Duration::days(day);
        let meal = store
            .create_meal(1, NewMeal { name: Some("Dinner".into()), eaten_at: Some(at) })
            .unwrap();
        store
            .add_entry(
                1,
                meal.id,
                NewFoodEntry { name: "Pasta".into(), calories: 700, ..Default::default() },
            )
            .unwrap();
        store
            .create_run(
                1,
                NewRun {
                    start_time: Some(at),
                    duration_seconds: 1800,
                    distance_meters: 6000.0,
                    ..Default::default()
                },
            )
            .unwrap();
    }

    let today = now.date_naive();
    group.bench_function("daily_30", |b| {
        b.iter(|| {
            store
                .daily_summaries(1, black_box(today - Duration::days(29)), today)
                .unwrap()
        })
    });

    group.bench_function("daily_365", |b| {
        b.iter(|| {
            store
                .daily_summaries(1, black_box(today - Duration::days(364)), today)
                .unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_tracker, bench_splits, bench_analytics);
criterion_main!(benches);
