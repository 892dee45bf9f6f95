//! Benchmarks for the realtime processor and the scope render path.
//!
//! Run with: cargo bench
//!
//! The processor owns the audio deadline (512 samples = 10.67ms at 48kHz);
//! the analyser and renderer run on the control thread, where a full scope
//! frame has a ~16ms budget at the default 60 Hz refresh rate.

use std::f32::consts::TAU;
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rtrb::RingBuffer;

use phosphor_synth::graph::{Analyser, GraphCommand, GraphProcessor};
use phosphor_synth::params::WaveShape;
use phosphor_synth::scope::{
    barrel_distort, Path, Point, Rgba, ScopeRenderer, StrokeStyle, Surface, TextAlign,
};
use phosphor_synth::FFT_SIZE;

/// Common audio callback buffer sizes.
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

fn bench_processor(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph/processor");

    for &voices in &[1usize, 4, 16] {
        let (mut cmd_tx, cmd_rx) = RingBuffer::new(64);
        let (tap_tx, mut tap_rx) = RingBuffer::new(FFT_SIZE * 8);
        let mut processor = GraphProcessor::new(48_000.0, 0.5, cmd_rx, tap_tx);

        // A spread-out unison stack, the worst realistic case per note.
        for i in 0..voices {
            cmd_tx
                .push(GraphCommand::SpawnVoice {
                    note: 60,
                    shape: WaveShape::Sawtooth,
                    frequency: 261.63,
                    detune_cents: i as f32 * 5.0,
                    gain: 0.5 / voices as f32,
                })
                .unwrap();
        }

        for &size in BLOCK_SIZES {
            let mut buffer = vec![0.0f32; size];
            group.bench_with_input(
                BenchmarkId::new(format!("{voices}_voices"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        processor.render_block(black_box(&mut buffer));
                        // Keep the tap ring from saturating mid-benchmark.
                        while tap_rx.pop().is_ok() {}
                    })
                },
            );
        }
    }

    group.finish();
}

fn bench_analyser(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph/analyser");

    let (mut tx, rx) = RingBuffer::new(FFT_SIZE * 2);
    let mut analyser = Analyser::new(rx, 0.8);
    for n in 0..FFT_SIZE {
        tx.push(0.5 * (TAU * 440.0 * n as f32 / 48_000.0).sin())
            .unwrap();
    }

    let mut time_bytes = vec![0u8; analyser.bin_count()];
    group.bench_function("byte_time_domain", |b| {
        b.iter(|| analyser.fill_byte_time_domain(black_box(&mut time_bytes)))
    });

    let mut freq_bytes = vec![0u8; analyser.bin_count()];
    group.bench_function("byte_frequency", |b| {
        b.iter(|| analyser.fill_byte_frequency(black_box(&mut freq_bytes)))
    });

    group.finish();
}

fn bench_distortion(c: &mut Criterion) {
    let mut group = c.benchmark_group("scope/distortion");

    // One trace worth of points.
    let points: Vec<Point> = (0..128)
        .map(|i| Point::new(i as f32 * 3.125, 100.0 + 80.0 * (TAU * i as f32 / 128.0).sin()))
        .collect();

    group.bench_function("barrel_trace", |b| {
        b.iter(|| {
            for &p in &points {
                black_box(barrel_distort(black_box(p), 400.0, 200.0, 0.1));
            }
        })
    });

    group.finish();
}

/// Surface that discards everything; measures renderer geometry only.
struct NullSurface;

impl Surface for NullSurface {
    fn width(&self) -> f32 {
        400.0
    }

    fn height(&self) -> f32 {
        200.0
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        black_box((x, y, w, h, color));
    }

    fn fill_radial_gradient(
        &mut self,
        cx: f32,
        cy: f32,
        inner_radius: f32,
        outer_radius: f32,
        inner: Rgba,
        outer: Rgba,
    ) {
        black_box((cx, cy, inner_radius, outer_radius, inner, outer));
    }

    fn stroke_path(&mut self, path: &Path, style: StrokeStyle) {
        black_box((path.commands().len(), style));
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, align: TextAlign, color: Rgba) {
        black_box((text.len(), x, y, align, color));
    }
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("scope/render");

    let renderer = ScopeRenderer::new();
    let mut surface = NullSurface;
    // The byte waveform of a clean sine, as the analyser hands it over.
    let samples: Vec<u8> = (0..1024)
        .map(|i| (128.0 + 100.0 * (TAU * i as f32 / 128.0).sin()) as u8)
        .collect();

    group.bench_function("full_frame", |b| {
        b.iter(|| renderer.render(black_box(&samples), Some(440.0), &mut surface))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_processor,
    bench_analyser,
    bench_distortion,
    bench_render,
);
criterion_main!(benches);
