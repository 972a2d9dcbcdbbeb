use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};
use kftrack_rs::{DetectBox, GatingMetric, KalmanFilter, StateCov, StateMean};

const NUM_TRACKS: usize = 256;

fn make_tracks(kalman_filter: &KalmanFilter) -> (Vec<StateMean>, Vec<StateCov>) {
    (0..NUM_TRACKS)
        .map(|i| {
            let i = i as f32;
            let measurement =
                DetectBox::new(10.0 + 3.0 * i, 20.0 + 2.0 * i, 0.5, 50.0 + i);
            kalman_filter.initiate(&measurement)
        })
        .unzip()
}

fn bench_predict(c: &mut Criterion) {
    let kalman_filter = KalmanFilter::default();
    let (means, covariances) = make_tracks(&kalman_filter);

    c.bench_function("predict", |b| {
        b.iter(|| {
            means
                .iter()
                .zip(covariances.iter())
                .map(|(mean, covariance)| kalman_filter.predict(mean, covariance))
                .collect::<Vec<_>>()
        });
    });

    c.bench_function("multi_predict", |b| {
        b.iter(|| kalman_filter.multi_predict(&means, &covariances).unwrap());
    });
}

fn bench_update_and_gating(c: &mut Criterion) {
    let kalman_filter = KalmanFilter::default();
    let (means, covariances) = make_tracks(&kalman_filter);
    let (means, covariances) =
        kalman_filter.multi_predict(&means, &covariances).unwrap();
    let detections = means
        .iter()
        .map(|mean| DetectBox::new(mean[(0, 0)] + 1.0, mean[(0, 1)] - 1.0, 0.5, mean[(0, 3)]))
        .collect::<Vec<_>>();

    c.bench_function("update", |b| {
        b.iter(|| {
            for i in 0..NUM_TRACKS {
                let _ = kalman_filter.update(&means[i], &covariances[i], &detections[i]);
            }
        });
    });

    c.bench_function("gating_distance", |b| {
        b.iter(|| {
            for i in 0..NUM_TRACKS {
                let _ = kalman_filter.gating_distance(
                    &means[i],
                    &covariances[i],
                    &detections,
                    false,
                    GatingMetric::Mahalanobis,
                );
            }
        });
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(10))
        .warm_up_time(Duration::from_secs(3));
    targets = bench_predict, bench_update_and_gating
}
criterion_main!(benches);
