//! Benchmarks for ROI projection and payload transforms

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::DMatrix;

use optode_core::data::{Payload, TimeSeries};
use optode_core::probe::{Channel, ChannelProbe, Probe};
use optode_roi::projection::build_projection;
use optode_roi::{RoiRegistry, RoiSpec};

/// Build a dense probe: `n_sources` sources each paired with 4 detectors,
/// at two signal types.
fn make_probe(n_sources: u32) -> Probe {
    let mut link = Vec::new();
    for source in 1..=n_sources {
        for detector in 1..=4 {
            link.push(Channel::new(source, detector, "hbo"));
            link.push(Channel::new(source, detector, "hbr"));
        }
    }
    Probe::Channel(ChannelProbe::new(link))
}

/// Configure a registry with one ROI per source (its 4 detectors grouped).
fn make_registry(n_sources: u32) -> RoiRegistry {
    let mut registry = RoiRegistry::new();
    registry.set_channel_probe(make_probe(n_sources)).unwrap();
    for source in 1..=n_sources {
        registry
            .add_roi(
                RoiSpec::new(vec![source; 4], vec![1, 2, 3, 4])
                    .named(format!("S{source}")),
            )
            .unwrap();
    }
    registry
}

/// Generate synthetic hemodynamic-looking data (slow sinusoids with noise)
fn generate_series(probe: Probe, n_samples: usize) -> TimeSeries {
    use std::f64::consts::PI;

    let n_channels = probe.len();
    let data = DMatrix::from_fn(n_samples, n_channels, |i, j| {
        let t = i as f64 / 10.0;
        let signal = (2.0 * PI * 0.1 * t + j as f64).sin();
        let noise = ((i * 31 + j * 7) as f64 * 0.123).sin() * 0.2;
        signal + noise
    });
    TimeSeries::new(probe, data, 10.0)
}

fn bench_projection_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("projection_build");

    for n_sources in [4, 16, 64].iter() {
        let registry = make_registry(*n_sources);
        let probe = registry.channel_probe().unwrap().clone();
        let roi_probe = registry.roi_probe().unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(n_sources),
            n_sources,
            |b, _| {
                b.iter(|| {
                    let p = build_projection(black_box(&probe), black_box(&roi_probe));
                    black_box(p)
                });
            },
        );
    }

    group.finish();
}

fn bench_series_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("series_apply");

    for n_samples in [256, 1024, 4096].iter() {
        let registry = make_registry(16);
        let series = generate_series(make_probe(16), *n_samples);
        let payload = Payload::Series(series);

        group.bench_with_input(
            BenchmarkId::from_parameter(n_samples),
            n_samples,
            |b, _| {
                b.iter(|| {
                    let out = registry.apply(black_box(&payload)).unwrap();
                    black_box(out)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_projection_build, bench_series_apply);
criterion_main!(benches);
