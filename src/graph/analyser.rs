use rtrb::Consumer;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use crate::FFT_SIZE;

/*
Analysis Tap
============

The analyser sits conceptually between the master gain and the output: the
processor publishes every post-gain sample into an SPSC ring, and this
struct drains that ring on the control thread into a rolling window of the
most recent FFT_SIZE samples.

Two read paths, matching the usual analyser-node contract:

  time domain   raw window samples mapped to bytes, 0.0 -> 128, full scale
                -> 0/255. Unsmoothed. This is what the scope draws.

  frequency     Blackman window, forward FFT, per-bin magnitude smoothed
                over time by the smoothing constant (an EMA: tau * previous
                + (1 - tau) * current), converted to dBFS and mapped onto
                bytes over [-100, -30] dB.

The smoothing constant only touches the frequency path; the time-domain
trace stays live.
*/

const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;

pub struct Analyser {
    tap: Consumer<f32>,
    window: Vec<f32>,
    pos: usize,
    smoothing: f32,
    fft: Arc<dyn Fft<f32>>,
    blackman: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl Analyser {
    pub fn new(tap: Consumer<f32>, smoothing: f32) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);

        // Blackman window (alpha = 0.16), the shape analyser nodes apply
        // before transforming.
        let blackman: Vec<f32> = (0..FFT_SIZE)
            .map(|i| {
                let x = std::f32::consts::TAU * i as f32 / FFT_SIZE as f32;
                0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos()
            })
            .collect();

        Self {
            tap,
            window: vec![0.0; FFT_SIZE],
            pos: 0,
            smoothing,
            fft,
            blackman,
            scratch: vec![Complex::new(0.0, 0.0); FFT_SIZE],
            smoothed: vec![0.0; FFT_SIZE / 2],
        }
    }

    /// Bins per frequency frame; also the byte count the scope reads.
    pub fn bin_count(&self) -> usize {
        FFT_SIZE / 2
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    /// Takes effect on the next frequency read.
    pub fn set_smoothing(&mut self, smoothing: f32) {
        self.smoothing = smoothing;
    }

    /// Pull everything the audio thread has published since the last read.
    fn drain(&mut self) {
        while let Ok(sample) = self.tap.pop() {
            self.window[self.pos] = sample;
            self.pos = (self.pos + 1) % FFT_SIZE;
        }
    }

    /// Sample `i` of the window in chronological order, oldest first.
    fn window_at(&self, i: usize) -> f32 {
        self.window[(self.pos + i) % FFT_SIZE]
    }

    /// Fill `out` with time-domain bytes: 128 is the zero line, 0 and 255
    /// are full negative/positive scale. Reading fewer than `FFT_SIZE`
    /// bytes takes the oldest part of the window.
    pub fn fill_byte_time_domain(&mut self, out: &mut [u8]) {
        self.drain();
        for (i, byte) in out.iter_mut().enumerate() {
            let x = if i < FFT_SIZE { self.window_at(i) } else { 0.0 };
            *byte = (128.0 * (1.0 + x)).floor().clamp(0.0, 255.0) as u8;
        }
    }

    /// Fill `out` with frequency-domain bytes, one per bin from DC upward.
    pub fn fill_byte_frequency(&mut self, out: &mut [u8]) {
        self.drain();

        for i in 0..FFT_SIZE {
            self.scratch[i].re = self.window_at(i) * self.blackman[i];
            self.scratch[i].im = 0.0;
        }
        self.fft.process(&mut self.scratch);

        let tau = self.smoothing;
        let span = MAX_DECIBELS - MIN_DECIBELS;
        for (k, slot) in self.smoothed.iter_mut().enumerate() {
            let bin = self.scratch[k];
            let magnitude = (bin.re * bin.re + bin.im * bin.im).sqrt() / FFT_SIZE as f32;
            *slot = tau * *slot + (1.0 - tau) * magnitude;

            if let Some(byte) = out.get_mut(k) {
                let db = 20.0 * slot.max(1e-12).log10();
                let scaled = 255.0 * (db - MIN_DECIBELS) / span;
                *byte = scaled.clamp(0.0, 255.0) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtrb::{Producer, RingBuffer};
    use std::f32::consts::TAU;

    const SR: f32 = 48_000.0;

    fn test_analyser(smoothing: f32) -> (Producer<f32>, Analyser) {
        let (tx, rx) = RingBuffer::<f32>::new(FFT_SIZE * 4);
        (tx, Analyser::new(rx, smoothing))
    }

    fn push_sine(tx: &mut Producer<f32>, freq: f32, amplitude: f32, count: usize) {
        for n in 0..count {
            tx.push(amplitude * (TAU * freq * n as f32 / SR).sin())
                .unwrap();
        }
    }

    #[test]
    fn silence_reads_as_center_bytes() {
        let (_tx, mut analyser) = test_analyser(0.8);
        let mut out = vec![0u8; analyser.bin_count()];
        analyser.fill_byte_time_domain(&mut out);
        assert!(
            out.iter().all(|&b| b == 128),
            "an empty window must sit on the 128 center line"
        );
    }

    #[test]
    fn time_domain_reads_oldest_first() {
        let (mut tx, mut analyser) = test_analyser(0.8);
        // First half of the window at -0.5, second half at +0.5.
        for _ in 0..FFT_SIZE / 2 {
            tx.push(-0.5).unwrap();
        }
        for _ in 0..FFT_SIZE / 2 {
            tx.push(0.5).unwrap();
        }

        let mut out = vec![0u8; FFT_SIZE / 2];
        analyser.fill_byte_time_domain(&mut out);
        assert!(
            out.iter().all(|&b| b == 64),
            "a 1024-byte read must cover the oldest (negative) half"
        );
    }

    #[test]
    fn full_scale_signal_spans_the_byte_range() {
        let (mut tx, mut analyser) = test_analyser(0.8);
        push_sine(&mut tx, 440.0, 1.0, FFT_SIZE);

        let mut out = vec![0u8; analyser.bin_count()];
        analyser.fill_byte_time_domain(&mut out);
        let max = *out.iter().max().unwrap();
        let min = *out.iter().min().unwrap();
        assert!(max > 220, "positive peaks should approach 255, got {}", max);
        assert!(min < 36, "negative peaks should approach 0, got {}", min);
    }

    #[test]
    fn spectrum_peaks_at_the_driven_bin() {
        let (mut tx, mut analyser) = test_analyser(0.0);
        // Bin-centered frequency: bin 32 of a 2048-point FFT at 48 kHz.
        // Amplitude kept low so the peak stays inside the dB byte range
        // instead of clamping (ties would make the argmax ambiguous).
        let freq = SR * 32.0 / FFT_SIZE as f32;
        push_sine(&mut tx, freq, 0.05, FFT_SIZE);

        let mut out = vec![0u8; analyser.bin_count()];
        analyser.fill_byte_frequency(&mut out);

        let peak = out
            .iter()
            .enumerate()
            .max_by_key(|(_, &b)| b)
            .map(|(k, _)| k)
            .unwrap();
        assert_eq!(peak, 32, "energy must land in the driven bin");
        assert!(out[32] > out[100], "peak bin must rise above the floor");
    }

    #[test]
    fn smoothing_damps_a_fresh_signal() {
        let freq = SR * 32.0 / FFT_SIZE as f32;

        let (mut live_tx, mut live) = test_analyser(0.0);
        push_sine(&mut live_tx, freq, 0.05, FFT_SIZE);
        let mut live_out = vec![0u8; live.bin_count()];
        live.fill_byte_frequency(&mut live_out);

        let (mut damped_tx, mut damped) = test_analyser(0.9);
        push_sine(&mut damped_tx, freq, 0.05, FFT_SIZE);
        let mut damped_out = vec![0u8; damped.bin_count()];
        damped.fill_byte_frequency(&mut damped_out);

        assert!(
            damped_out[32] < live_out[32],
            "a 0.9 smoothing constant must damp the first frame ({} vs {})",
            damped_out[32],
            live_out[32]
        );
    }

    #[test]
    fn window_persists_between_reads() {
        let (mut tx, mut analyser) = test_analyser(0.8);
        push_sine(&mut tx, 440.0, 1.0, FFT_SIZE);

        let mut first = vec![0u8; 64];
        analyser.fill_byte_time_domain(&mut first);
        // Nothing new published; the window must read back unchanged.
        let mut second = vec![0u8; 64];
        analyser.fill_byte_time_domain(&mut second);
        assert_eq!(first, second);
    }
}
