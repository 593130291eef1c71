//! Performance benchmarks for track-edit-lib
//!
//! Run with: cargo bench --package track-edit-lib
//!
//! Covers the two hot paths: diffing an edited track and replaying a long log.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use track_edit_lib::{Coordinate, Engine, Feature, FeatureCollection, Operation, diff, replay};

/// Generate a wiggly track with the specified number of points.
fn generate_track(num_points: usize, base_lat: f64, base_lon: f64) -> Vec<Coordinate> {
    (0..num_points)
        .map(|i| {
            let t = i as f64 / num_points as f64;
            let lat = base_lat + t * 0.1 + (t * 50.0).sin() * 0.001;
            let lon = base_lon + t * 0.1 + (t * 30.0).cos() * 0.001;
            Coordinate::new(lon, lat)
        })
        .collect()
}

/// Generate multiple tracks spread across an area
fn generate_collection(num_tracks: usize, points_per_track: usize) -> FeatureCollection {
    FeatureCollection::new(
        (0..num_tracks)
            .map(|i| {
                let lat_offset = (i % 10) as f64 * 0.1;
                let lon_offset = (i / 10) as f64 * 0.1;
                let track = generate_track(points_per_track, 60.3 + lat_offset, 5.3 + lon_offset);
                Feature::with_distance(track, points_per_track as f64)
            })
            .collect(),
    )
}

/// Move every tenth point a little, as a drag session on the map would
fn perturb(track: &[Coordinate]) -> Vec<Coordinate> {
    track
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if i % 10 == 0 {
                Coordinate::new(c.lng() + 0.0001, c.lat())
            } else {
                c.clone()
            }
        })
        .collect()
}

// ============================================================================
// Core Benchmarks - Key performance indicators
// ============================================================================

fn bench_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff");

    for &points in &[100usize, 500, 2_000] {
        let source = generate_track(points, 60.39, 5.32);
        let target = perturb(&source);

        group.throughput(Throughput::Elements(points as u64));
        group.bench_with_input(BenchmarkId::new("perturbed", points), &points, |b, _| {
            b.iter(|| diff(&source, &target));
        });
    }

    group.finish();
}

fn bench_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay");
    group.sample_size(20);

    // 50 tracks with 1000 points each, split and merged back repeatedly
    let base = generate_collection(50, 1_000);
    let log: Vec<Operation> = (0..100)
        .flat_map(|i| {
            let index = i % 49;
            [
                Operation::Split {
                    feature_index: index,
                    point_index: 500,
                },
                Operation::Merge {
                    feature_indices: vec![index, index + 1],
                },
            ]
        })
        .collect();

    group.throughput(Throughput::Elements(log.len() as u64));
    group.bench_function("50x1k_200_ops", |b| {
        b.iter(|| replay(&base, &log).unwrap());
    });

    group.finish();
}

fn bench_engine_mutation(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    group.sample_size(20);

    let base = generate_collection(20, 1_000);
    group.bench_function("split_undo_20x1k", |b| {
        let mut engine = Engine::new(base.clone(), Vec::new());
        b.iter(|| {
            engine.split(3, 400).unwrap();
            engine.undo().unwrap();
        });
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(benches, bench_diff, bench_replay, bench_engine_mutation);

criterion_main!(benches);
