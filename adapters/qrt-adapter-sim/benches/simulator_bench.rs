//! Benchmarks for the local simulator engines
//!
//! Run with: cargo bench -p qrt-adapter-sim

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::f64::consts::PI;

use qrt_adapter_sim::{LocalSimulator, NoiseModel};
use qrt_hal::{Backend, RunOptions, SimulationMethod};
use qrt_ir::{Circuit, QubitId, SparsePauliOp, reference};

/// Layered circuit of rotations and CX ladders, measured at the end.
fn layered(n: u32, layers: usize) -> Circuit {
    let mut circuit = Circuit::with_size(format!("layered_{n}"), n, n);
    for layer in 0..layers {
        for q in 0..n {
            circuit
                .ry(PI / (layer as f64 + 2.0), QubitId(q))
                .unwrap()
                .rz(PI / 3.0, QubitId(q))
                .unwrap();
        }
        for q in 0..n.saturating_sub(1) {
            circuit.cx(QubitId(q), QubitId(q + 1)).unwrap();
        }
    }
    circuit.measure_all().unwrap();
    circuit
}

fn bench_methods(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("methods");

    for (method, n) in [
        (SimulationMethod::Statevector, 12),
        (SimulationMethod::DensityMatrix, 6),
        (SimulationMethod::Stabilizer, 100),
    ] {
        let circuit = if method == SimulationMethod::Stabilizer {
            reference::ghz(n).unwrap()
        } else {
            layered(n, 4)
        };
        let backend = LocalSimulator::with_method(method);
        let options = RunOptions::new(1024).with_seed(1);
        group.bench_with_input(BenchmarkId::new(method.as_str(), n), &circuit, |b, circuit| {
            b.iter(|| {
                rt.block_on(async {
                    let id = backend
                        .submit(black_box(std::slice::from_ref(circuit)), &options)
                        .await
                        .unwrap();
                    backend.result(&id).await.unwrap()
                })
            });
        });
    }

    group.finish();
}

fn bench_noisy_trajectories(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let noise = NoiseModel::new()
        .with_gate_error_1q(0.001)
        .with_gate_error_2q(0.01)
        .with_uniform_readout_error(5, 0.02);
    let backend = LocalSimulator::with_method(SimulationMethod::Statevector).noise(noise);
    let circuit = layered(5, 3);
    let options = RunOptions::new(256).with_seed(3);

    c.bench_function("noisy_statevector_5q", |b| {
        b.iter(|| {
            rt.block_on(async {
                let id = backend
                    .submit(std::slice::from_ref(&circuit), &options)
                    .await
                    .unwrap();
                backend.result(&id).await.unwrap()
            })
        });
    });
}

fn bench_estimate(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let backend = LocalSimulator::with_method(SimulationMethod::Statevector);
    let circuit = layered(10, 3);
    let observable = SparsePauliOp::from_list([
        ("ZZIIIIIIII", 1.0),
        ("IIIIXXIIII", 0.5),
        ("YIIIIIIIIY", 0.25),
    ])
    .unwrap();

    c.bench_function("estimate_10q", |b| {
        b.iter(|| {
            rt.block_on(backend.estimate(black_box(&circuit), std::slice::from_ref(&observable)))
                .unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_methods,
    bench_noisy_trajectories,
    bench_estimate
);
criterion_main!(benches);
